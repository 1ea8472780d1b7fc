//! Size budget and timing constants for the Sender.

use std::time::Duration;

/// Hard destination-imposed cap on transaction data, in bytes.
pub const TX_MAX_DATA_SIZE: i64 = 524_288;

/// Fraction of `TX_MAX_DATA_SIZE` reserved for base64 expansion and envelope overhead.
pub const TX_OVERHEAD_SCALE: f64 = 0.37;

/// Wait between tx-pool-overflow retries, and between result-polling attempts.
pub const DEFAULT_RELAY_RESEND_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_GET_RELAY_RESULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default `stepLimit` when the operator does not configure one.
pub const DEFAULT_STEP_LIMIT: u64 = 0x9502f900;

/// Sub-code (from RPC system-error bytes 1..5) that marks a transaction as already seen.
pub const DUPLICATE_TRANSACTION_CODE: i32 = 4;

/// Sub-code marking a transaction as expired, requiring a fresh signature.
pub const EXPIRED_TRANSACTION_CODE: i32 = 10;

/// Lower bound (inclusive) of the BMV revert failure-code range.
pub const FAILURE_CODE_REVERT: i64 = 32;

/// Upper bound (inclusive) of the BMV revert failure-code range.
pub const FAILURE_CODE_END: i64 = 999;

/// The Sender's payload byte budget before base64 expansion: `floor(TX_MAX_DATA_SIZE / (1 +
/// TX_OVERHEAD_SCALE))`.
pub fn tx_size_limit() -> i64 {
    ((TX_MAX_DATA_SIZE as f64) / (1.0 + TX_OVERHEAD_SCALE)).floor() as i64
}
