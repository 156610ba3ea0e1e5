//! X-Ray trace identifier encoding.
//!
//! External consumers identify a trace by the X-Ray form of its 128-bit
//! identifier: a constant version octet, the first 8 hex characters, and the
//! remaining 24, joined by dashes.

use serde::Serialize;

const TRACE_ID_VERSION: &str = "1";
const TRACE_ID_DELIMITER: &str = "-";
const TRACE_ID_FIRST_PART_LENGTH: usize = 8;

/// Render a 128-bit trace identifier in the X-Ray wire format.
///
/// The identifier is written as a zero-padded 32-character lowercase hex
/// string and split 8/24 after the version field. Total and deterministic
/// over all inputs.
pub fn encode_trace_id(trace_id: u128) -> String {
    let hex = format!("{trace_id:032x}");
    format!(
        "{TRACE_ID_VERSION}{TRACE_ID_DELIMITER}{}{TRACE_ID_DELIMITER}{}",
        &hex[..TRACE_ID_FIRST_PART_LENGTH],
        &hex[TRACE_ID_FIRST_PART_LENGTH..],
    )
}

/// JSON body returned by the trace-emitting endpoints.
#[derive(Debug, Serialize)]
pub struct TraceIdResponse {
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

impl TraceIdResponse {
    pub fn new(trace_id: u128) -> Self {
        Self {
            trace_id: encode_trace_id(trace_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn zero_is_fully_padded() {
        assert_eq!(encode_trace_id(0), "1-00000000-000000000000000000000000");
    }

    #[test]
    fn max_value_encodes_without_truncation() {
        assert_eq!(
            encode_trace_id(u128::MAX),
            "1-ffffffff-ffffffffffffffffffffffff"
        );
    }

    #[test]
    fn fields_have_fixed_widths() {
        let encoded = encode_trace_id(0x5759e988bd862e3fe1be46a994272793);
        let parts: Vec<&str> = encoded.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "1");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 24);
        assert!(is_lower_hex(parts[1]));
        assert!(is_lower_hex(parts[2]));
    }

    #[test]
    fn epoch_prefix_is_the_leading_bytes() {
        let encoded = encode_trace_id(0x5759e988bd862e3fe1be46a994272793);
        assert_eq!(encoded, "1-5759e988-bd862e3fe1be46a994272793");
    }

    #[test]
    fn encoding_is_deterministic() {
        let id = 0x0102030405060708090a0b0c0d0e0f10u128;
        assert_eq!(encode_trace_id(id), encode_trace_id(id));
    }

    #[test]
    fn response_serializes_with_trace_id_key() {
        let body = serde_json::to_string(&TraceIdResponse::new(0)).unwrap();
        assert_eq!(
            body,
            "{\"traceId\":\"1-00000000-000000000000000000000000\"}"
        );
    }
}
