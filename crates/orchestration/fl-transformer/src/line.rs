//! Single-line transformation: skip rules, parsing and date derivation.

use chrono::FixedOffset;
use fl_error::LineError;
use fl_types::{FlowLogDocument, FlowLogRecord, HEADER_TAG, SRC_ADDR_POSITION};
use serde::Serialize;
use std::collections::HashSet;

/// Why a line produced no document without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty or whitespace-only line
    Blank,

    /// File header (`version account-id ...`)
    Header,

    /// Source address is in the excluded set
    ExcludedAddress,
}

/// Result of transforming one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Document(FlowLogDocument),
    Skipped(SkipReason),
}

/// Applies the skip rules and builds the document for one line.
///
/// Rules are evaluated in a fixed order, and each later rule only runs when
/// the earlier ones did not match:
///
/// 1. blank line
/// 2. first token is `version`
/// 3. fourth token is an excluded address (when there is a fourth token)
/// 4. token count and start timestamp validation
#[derive(Debug, Clone)]
pub struct LineTransformer {
    excluded_addresses: HashSet<String>,
    offset: FixedOffset,
}

impl LineTransformer {
    /// Create a transformer dropping `excluded_addresses` and rendering dates
    /// in `offset`.
    pub fn new<I, S>(excluded_addresses: I, offset: FixedOffset) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_addresses: excluded_addresses.into_iter().map(Into::into).collect(),
            offset,
        }
    }

    /// Transforms one line of text.
    pub fn transform(&self, line: &str) -> Result<LineOutcome, LineError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some(first) = tokens.first() else {
            return Ok(LineOutcome::Skipped(SkipReason::Blank));
        };

        if *first == HEADER_TAG {
            return Ok(LineOutcome::Skipped(SkipReason::Header));
        }

        if tokens
            .get(SRC_ADDR_POSITION)
            .is_some_and(|src| self.excluded_addresses.contains(*src))
        {
            return Ok(LineOutcome::Skipped(SkipReason::ExcludedAddress));
        }

        let record = FlowLogRecord::from_tokens(&tokens)?;
        let document = FlowLogDocument::from_record(record, &self.offset)?;

        Ok(LineOutcome::Document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "2 123456789012 eni-0a1b2c3d 10.0.1.5 172.31.16.139 49761 443 6 20 4249 1700000000 1700000060 ACCEPT OK";
    const EXCLUDED: &str = "2 123456789012 eni-0a1b2c3d 10.0.0.14 172.31.16.139 49761 443 6 20 4249 1700000000 1700000060 ACCEPT OK";
    const HEADER: &str = "version account-id interface-id srcaddr dstaddr srcport dstport protocol packets bytes start end action log-status";

    fn transformer() -> LineTransformer {
        LineTransformer::new(["10.0.0.14"], FixedOffset::east_opt(8 * 3600).unwrap())
    }

    fn document(outcome: LineOutcome) -> FlowLogDocument {
        match outcome {
            LineOutcome::Document(document) => document,
            other => panic!("Expected a document, got: {:?}", other),
        }
    }

    #[test]
    fn test_valid_line_maps_every_field() {
        let doc = document(transformer().transform(VALID).unwrap());

        assert_eq!(doc.version, "2");
        assert_eq!(doc.account_id, "123456789012");
        assert_eq!(doc.interface_id, "eni-0a1b2c3d");
        assert_eq!(doc.ip_address, "10.0.1.5");
        assert_eq!(doc.src_addr, "10.0.1.5");
        assert_eq!(doc.dst_addr, "172.31.16.139");
        assert_eq!(doc.src_port, "49761");
        assert_eq!(doc.dst_port, "443");
        assert_eq!(doc.protocol, "6");
        assert_eq!(doc.packets, "20");
        assert_eq!(doc.bytes, "4249");
        assert_eq!(doc.start, "1700000000");
        assert_eq!(doc.end, "1700000060");
        assert_eq!(doc.action, "ACCEPT");
        assert_eq!(doc.log_status, "OK");
        assert_eq!(doc.date, "2023-11-15T06:13:20");
    }

    #[test]
    fn test_runs_of_whitespace_split_once() {
        let spaced = VALID.replace(' ', " \t  ");
        let doc = document(transformer().transform(&spaced).unwrap());
        assert_eq!(doc.dst_addr, "172.31.16.139");
        assert_eq!(doc.log_status, "OK");
    }

    #[test]
    fn test_header_line_skipped() {
        assert_eq!(
            transformer().transform(HEADER).unwrap(),
            LineOutcome::Skipped(SkipReason::Header)
        );
    }

    #[test]
    fn test_header_skipped_regardless_of_shape() {
        for line in ["version", "version 10.0.0.14", "version a b 10.0.0.14 x"] {
            assert_eq!(
                transformer().transform(line).unwrap(),
                LineOutcome::Skipped(SkipReason::Header)
            );
        }
    }

    #[test]
    fn test_excluded_address_skipped() {
        assert_eq!(
            transformer().transform(EXCLUDED).unwrap(),
            LineOutcome::Skipped(SkipReason::ExcludedAddress)
        );
    }

    #[test]
    fn test_excluded_address_checked_before_shape() {
        assert_eq!(
            transformer().transform("2 123 eni-1 10.0.0.14").unwrap(),
            LineOutcome::Skipped(SkipReason::ExcludedAddress)
        );
    }

    #[test]
    fn test_excluded_address_only_matches_source() {
        let line = VALID.replace("172.31.16.139", "10.0.0.14");
        let doc = document(transformer().transform(&line).unwrap());
        assert_eq!(doc.dst_addr, "10.0.0.14");
    }

    #[test]
    fn test_no_exclusions_configured() {
        let transformer = LineTransformer::new(Vec::<String>::new(), FixedOffset::east_opt(0).unwrap());
        let doc = document(transformer.transform(EXCLUDED).unwrap());
        assert_eq!(doc.src_addr, "10.0.0.14");
        assert_eq!(doc.date, "2023-11-14T22:13:20");
    }

    #[test]
    fn test_blank_line_skipped() {
        assert_eq!(
            transformer().transform("   \t ").unwrap(),
            LineOutcome::Skipped(SkipReason::Blank)
        );
    }

    #[test]
    fn test_short_line_is_malformed() {
        let err = transformer().transform("2 123456789012 eni-1 10.0.1.5 10.0.1.6").unwrap_err();
        assert_eq!(
            err,
            LineError::Malformed {
                expected: 14,
                found: 5
            }
        );
    }

    #[test]
    fn test_non_numeric_start_is_timestamp_error() {
        let line = VALID.replace("1700000000", "yesterday");
        let err = transformer().transform(&line).unwrap_err();
        assert!(matches!(err, LineError::TimestampParse { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn test_nodata_record_indexed() {
        let line = "2 123456789012 eni-0a1b2c3d - - - - - - - 1700000000 1700000060 - NODATA";
        let doc = document(transformer().transform(line).unwrap());
        assert_eq!(doc.src_addr, "-");
        assert_eq!(doc.ip_address, "-");
        assert_eq!(doc.log_status, "NODATA");
    }
}
