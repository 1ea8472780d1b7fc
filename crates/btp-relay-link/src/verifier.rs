//! Verifier (BMV) revert codes, as normalized into [`btp_relay_types::RelayOutcome::Revert`]
//! by the Sender (§4.3.6).

/// Numeric codes assigned to the BMV error taxonomy.
///
/// The source chain's BMV reports these as string codes; the Sender already normalizes them
/// into the small integer range below before they reach the Link (see
/// `btp_relay_sender::sender::classify_result`). Any code outside this range is an
/// unrecognized verifier error and is fatal, same as `BMVUnknown`.
pub mod codes {
    pub const BMV_UNKNOWN: i64 = 0;
    pub const BMV_NOT_VERIFIABLE: i64 = 1;
    pub const BMV_ALREADY_VERIFIED: i64 = 2;
    pub const BMV_REVERT_INVALID_BLOCK_WITNESS_OLD: i64 = 3;
}

/// A decoded BMV revert, dispatched on in the Link's result handler (§4.3.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierError {
    Unknown,
    NotVerifiable,
    AlreadyVerified,
    RevertInvalidBlockWitnessOld,
    /// Any code outside the recognized taxonomy; treated the same as `Unknown` (fatal).
    Other(i64),
}

impl VerifierError {
    pub fn from_code(code: i64) -> Self {
        match code {
            codes::BMV_UNKNOWN => Self::Unknown,
            codes::BMV_NOT_VERIFIABLE => Self::NotVerifiable,
            codes::BMV_ALREADY_VERIFIED => Self::AlreadyVerified,
            codes::BMV_REVERT_INVALID_BLOCK_WITNESS_OLD => Self::RevertInvalidBlockWitnessOld,
            other => Self::Other(other),
        }
    }
}
