//! Crate includes reusable utils shared across the relay services.
//! Such as initializing the tracing framework and whatever else.

pub mod env;
pub mod logging;
pub mod retry;
