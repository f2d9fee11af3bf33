//! Flow-log record and indexed document types.

use chrono::{DateTime, FixedOffset};
use fl_error::LineError;
use serde::{Deserialize, Serialize};

/// Number of positional fields in a flow-log line.
pub const FLOW_LOG_FIELD_COUNT: usize = 14;

/// First token of the header line written at the top of every flow-log file.
pub const HEADER_TAG: &str = "version";

/// Position of the source address token.
pub const SRC_ADDR_POSITION: usize = 3;

/// Offset of the `date` field from UTC, in seconds (UTC+8, Asia/Singapore).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Output format of the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One flow-log line split into its positional fields.
///
/// Values are kept verbatim; numeric-looking fields are not coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLogRecord {
    pub version: String,
    pub account_id: String,
    pub interface_id: String,
    pub src_addr: String,
    pub dst_addr: String,
    pub src_port: String,
    pub dst_port: String,
    pub protocol: String,
    pub packets: String,
    pub bytes: String,
    pub start: String,
    pub end: String,
    pub action: String,
    pub log_status: String,
}

impl FlowLogRecord {
    /// Builds a record from whitespace-separated tokens.
    ///
    /// Tokens beyond the fourteenth are ignored.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self, LineError> {
        let [
            version,
            account_id,
            interface_id,
            src_addr,
            dst_addr,
            src_port,
            dst_port,
            protocol,
            packets,
            bytes,
            start,
            end,
            action,
            log_status,
            ..,
        ] = tokens
        else {
            return Err(LineError::Malformed {
                expected: FLOW_LOG_FIELD_COUNT,
                found: tokens.len(),
            });
        };

        Ok(Self {
            version: version.to_string(),
            account_id: account_id.to_string(),
            interface_id: interface_id.to_string(),
            src_addr: src_addr.to_string(),
            dst_addr: dst_addr.to_string(),
            src_port: src_port.to_string(),
            dst_port: dst_port.to_string(),
            protocol: protocol.to_string(),
            packets: packets.to_string(),
            bytes: bytes.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            action: action.to_string(),
            log_status: log_status.to_string(),
        })
    }
}

/// Document written to the index engine for one record.
///
/// Always serializes to exactly 16 string-valued keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLogDocument {
    pub version: String,
    pub account_id: String,
    pub interface_id: String,
    /// Copy of `src_addr` so the index maps it as an IP field
    pub ip_address: String,
    pub src_addr: String,
    pub dst_addr: String,
    pub src_port: String,
    pub dst_port: String,
    pub protocol: String,
    pub packets: String,
    pub bytes: String,
    pub start: String,
    pub end: String,
    pub action: String,
    pub log_status: String,
    /// `start` rendered as local time in the configured offset
    pub date: String,
}

impl FlowLogDocument {
    /// Builds the document for a record, deriving `date` from `start`.
    pub fn from_record(record: FlowLogRecord, offset: &FixedOffset) -> Result<Self, LineError> {
        let date = format_start_time(&record.start, offset)?;

        Ok(Self {
            ip_address: record.src_addr.clone(),
            version: record.version,
            account_id: record.account_id,
            interface_id: record.interface_id,
            src_addr: record.src_addr,
            dst_addr: record.dst_addr,
            src_port: record.src_port,
            dst_port: record.dst_port,
            protocol: record.protocol,
            packets: record.packets,
            bytes: record.bytes,
            start: record.start,
            end: record.end,
            action: record.action,
            log_status: record.log_status,
            date,
        })
    }
}

/// Renders an epoch-seconds string as `YYYY-MM-DDTHH:MM:SS` in `offset`.
pub fn format_start_time(value: &str, offset: &FixedOffset) -> Result<String, LineError> {
    let seconds: i64 = value.parse().map_err(|e: std::num::ParseIntError| {
        LineError::TimestampParse {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;

    let utc = DateTime::from_timestamp(seconds, 0).ok_or_else(|| LineError::TimestampParse {
        value: value.to_string(),
        reason: "out of range".to_string(),
    })?;

    Ok(utc.with_timezone(offset).format(DATE_FORMAT).to_string())
}
