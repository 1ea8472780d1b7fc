//! The destination wire surface: `BMCRelayMethod`/`BMCFragmentMethod` transaction shapes and
//! the fragmentation algorithm that turns one relay message into one or more of them.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

pub const BMC_RELAY_METHOD: &str = "handleRelayMessage";
pub const BMC_FRAGMENT_METHOD: &str = "handleFragment";
pub const BMC_GET_STATUS_METHOD: &str = "getStatus";

/// One piece of a relay message as it will be submitted to the destination.
///
/// `index` is `None` for a single, unfragmented relay message (a plain `Relay` call);
/// `Some(i)` for one piece of a multi-fragment submission (a `Fragment` call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub index: Option<i64>,
    pub payload: Vec<u8>,
}

/// Splits `bytes` into fragments no larger than `limit` bytes each, with indices following
/// §4.2's sequencing: first `-(N-1)`, then strictly decreasing `N-2, ..., 1`, last `0`.
///
/// Panics if `limit <= 0`.
pub fn plan_fragments(bytes: &[u8], limit: i64) -> Vec<Fragment> {
    assert!(limit > 0, "tx size limit must be positive");

    let len = bytes.len() as i64;
    let n = if len == 0 { 1 } else { (len + limit - 1) / limit };

    if n <= 1 {
        return vec![Fragment {
            index: None,
            payload: bytes.to_vec(),
        }];
    }

    let mut out = Vec::with_capacity(n as usize);
    let mut offset = 0usize;
    for i in 0..n {
        let end = ((offset as i64 + limit) as usize).min(bytes.len());
        let payload = bytes[offset..end].to_vec();
        let index = if i == 0 { -(n - 1) } else { n - 1 - i };
        out.push(Fragment {
            index: Some(index),
            payload,
        });
        offset = end;
    }
    out
}

/// An unsigned transaction destined for the BMC contract, in the shape described by §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub version: &'static str,
    pub from: String,
    pub to: String,
    pub network_id: String,
    pub step_limit_hex: String,
    pub data_type: &'static str,
    pub method: &'static str,
    pub prev: String,
    pub messages_b64url: String,
    pub index_hex: Option<String>,
}

impl UnsignedTx {
    pub fn for_fragment(
        from: String,
        to: String,
        network_id: String,
        step_limit: u64,
        prev: String,
        fragment: &Fragment,
    ) -> Self {
        let messages_b64url = URL_SAFE_NO_PAD.encode(&fragment.payload);
        let (method, index_hex) = match fragment.index {
            None => (BMC_RELAY_METHOD, None),
            Some(idx) => (BMC_FRAGMENT_METHOD, Some(format_index_hex(idx))),
        };

        Self {
            version: "0x3",
            from,
            to,
            network_id,
            step_limit_hex: format!("{step_limit:#x}"),
            data_type: "call",
            method,
            prev,
            messages_b64url,
            index_hex,
        }
    }
}

/// Hex-encodes a (possibly negative) fragment index the way the destination expects:
/// `0x`-prefixed lowercase, with a leading `-` for negative values.
fn format_index_hex(idx: i64) -> String {
    if idx < 0 {
        format!("-{:#x}", idx.unsigned_abs())
    } else {
        format!("{idx:#x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_fragment_for_small_payload() {
        let bytes = vec![0u8; 100_000];
        let frags = plan_fragments(&bytes, 382_691);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].index, None);
        assert_eq!(frags[0].payload.len(), 100_000);
    }

    #[test]
    fn three_fragments_for_900k_payload() {
        let limit = 382_691i64;
        let bytes = vec![0u8; 900_000];
        let frags = plan_fragments(&bytes, limit);
        assert_eq!(frags.len(), 3);
        assert_eq!(
            frags.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![Some(-2), Some(1), Some(0)]
        );
        for f in &frags {
            assert!(f.payload.len() as i64 <= limit);
        }
        assert_eq!(
            frags.iter().map(|f| f.payload.len()).sum::<usize>(),
            900_000
        );
    }

    #[test]
    fn fragments_reassemble_to_original_bytes() {
        let limit = 100i64;
        let bytes: Vec<u8> = (0..950u32).map(|i| (i % 251) as u8).collect();
        let frags = plan_fragments(&bytes, limit);

        let mut ordered = frags.clone();
        ordered.sort_by_key(|f| match f.index {
            None => 0,
            Some(i) => -i,
        });
        let reassembled: Vec<u8> = ordered.into_iter().flat_map(|f| f.payload).collect();
        assert_eq!(reassembled, bytes);
    }

    #[test]
    fn index_hex_is_0x_prefixed_lowercase_with_leading_minus() {
        assert_eq!(format_index_hex(-2), "-0x2");
        assert_eq!(format_index_hex(1), "0x1");
        assert_eq!(format_index_hex(0), "0x0");
    }
}
