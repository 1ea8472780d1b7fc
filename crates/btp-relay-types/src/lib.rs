//! Shared data model for the BTP relay Link/Sender core: link status, relay message items,
//! the relay message itself, its builder, and the outcomes the Sender reports back.

mod builder;
mod item;
mod message;
mod result;
mod status;

pub use builder::RelayMessageBuilder;
pub use item::{BlockProof, BlockUpdate, MessageProof, RelayMessageItem};
pub use message::RelayMessage;
pub use result::{InflightRecord, RelayOutcome, RelayResult};
pub use status::{BmcLinkStatus, ReceiveStatus, Verifier};
