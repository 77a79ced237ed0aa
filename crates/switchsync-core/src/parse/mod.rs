// ── CLI output parsing ──
//
// Turns raw CLI text into partial interface records. Two sources: the
// tabular interface-status listing and running-config interface stanzas.
// Both are pure functions of text plus dialect; a malformed row produces
// one `ParseError` and is skipped, never aborting the rest of the input.

mod running_config;
mod status;

use serde::Serialize;
use thiserror::Error;

use crate::model::{LinkStatus, PortMode};

pub use running_config::parse_running_config;
pub use status::parse_status_table;

/// A row or stanza line that could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("line {line}: {reason}: {text:?}")]
pub struct ParseError {
    /// 1-based line number within the parsed text.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Interface fields reported by a single source. Absent fields are `None`
/// and get merged with the other source or defaults later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialInterfaceRecord {
    pub port: String,
    pub description: Option<String>,
    pub status: Option<LinkStatus>,
    pub status_raw: Option<String>,
    pub mode: Option<PortMode>,
    pub vlan: Option<String>,
    pub native_vlan: Option<String>,
    pub allowed_vlan: Option<String>,
    pub duplex: Option<String>,
    pub speed: Option<String>,
    pub transceiver: Option<String>,
}

impl PartialInterfaceRecord {
    pub(crate) fn new(port: String) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }
}

/// Records parsed from one blob of text plus the rows that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub records: Vec<PartialInterfaceRecord>,
    pub errors: Vec<ParseError>,
}

impl ParseReport {
    pub(crate) fn error(&mut self, line: usize, text: &str, reason: impl Into<String>) {
        self.errors.push(ParseError {
            line,
            text: text.trim().to_owned(),
            reason: reason.into(),
        });
    }
}
