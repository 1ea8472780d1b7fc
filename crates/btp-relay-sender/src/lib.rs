//! Converts logical relay messages into destination transactions: signing, fragmentation,
//! pool-overflow retry, and result polling (§4.2 of the design).

pub mod constants;
mod errors;
pub mod mock;
mod rpc;
mod sender;
mod wire;

pub use errors::{SenderError, SenderResult, SubmitError, TxResultError};
pub use rpc::{RpcClient, SignedTx, TxResult, TxStatus, Wallet};
pub use sender::{RpcSender, Sender, SenderConfig};
pub use wire::{plan_fragments, Fragment, UnsignedTx};
