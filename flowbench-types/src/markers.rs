//! Marker lines written by the provisioner on standard output.
//!
//! A successful provisioning run prints exactly two lines:
//!
//! ```text
//! BENCHMARK_DATA:FLOW_ID=<flow id>
//! BENCHMARK_DATA:API_KEY=<api key>
//! ```
//!
//! Drivers find them by prefix matching; any other line is ignored.

use std::fmt;

/// Prefix shared by all marker lines.
pub const MARKER_PREFIX: &str = "BENCHMARK_DATA:";

/// Full prefix of the line carrying the flow identifier.
pub const FLOW_ID_MARKER: &str = "BENCHMARK_DATA:FLOW_ID=";

/// Full prefix of the line carrying the API key.
pub const API_KEY_MARKER: &str = "BENCHMARK_DATA:API_KEY=";

/// The identifiers produced by one provisioning run.
///
/// Both fields are guaranteed to be non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct BenchmarkData {
    flow_id: String,
    api_key: String,
}

impl BenchmarkData {
    /// Creates benchmark data from a flow identifier and an API key.
    ///
    /// Returns `None` if either of them is empty.
    ///
    /// ```
    /// use flowbench_types::BenchmarkData;
    ///
    /// assert!(BenchmarkData::new("flow-xyz", "key-abc").is_some());
    /// assert!(BenchmarkData::new("", "key-abc").is_none());
    /// ```
    pub fn new(flow_id: impl Into<String>, api_key: impl Into<String>) -> Option<Self> {
        let flow_id = flow_id.into();
        let api_key = api_key.into();
        if flow_id.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self { flow_id, api_key })
    }

    /// The identifier of the benchmark flow.
    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    /// The API key authorizing runs of the flow.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the two marker lines, flow identifier first.
    pub fn marker_lines(&self) -> [String; 2] {
        [
            format!("{FLOW_ID_MARKER}{}", self.flow_id),
            format!("{API_KEY_MARKER}{}", self.api_key),
        ]
    }

    /// Extracts benchmark data from the output of a provisioning run.
    ///
    /// Lines without the marker prefix are skipped. If a marker occurs more than once, the last
    /// occurrence wins.
    pub fn parse(output: &str) -> Result<Self, ParseError> {
        let mut flow_id = None;
        let mut api_key = None;

        for line in output.lines() {
            let line = line.trim_end_matches('\r');
            if let Some(value) = line.strip_prefix(FLOW_ID_MARKER) {
                flow_id = Some(value);
            } else if let Some(value) = line.strip_prefix(API_KEY_MARKER) {
                api_key = Some(value);
            }
        }

        let flow_id = flow_id
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::Missing("FLOW_ID"))?;
        let api_key = api_key
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::Missing("API_KEY"))?;

        Ok(Self {
            flow_id: flow_id.to_owned(),
            api_key: api_key.to_owned(),
        })
    }
}

impl fmt::Debug for BenchmarkData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkData")
            .field("flow_id", &self.flow_id)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

/// An error returned by [`BenchmarkData::parse`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A marker line is absent or has an empty value.
    #[error("missing {MARKER_PREFIX}{0} line")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_flow_id_before_api_key() {
        let data = BenchmarkData::new("flow-xyz", "key-abc").unwrap();
        assert_eq!(
            data.marker_lines(),
            [
                "BENCHMARK_DATA:FLOW_ID=flow-xyz".to_owned(),
                "BENCHMARK_DATA:API_KEY=key-abc".to_owned(),
            ]
        );
    }

    #[test]
    fn parses_among_other_output() {
        let output = "\
            some progress output\n\
            BENCHMARK_DATA:FLOW_ID=flow-xyz\r\n\
            BENCHMARK_DATA:API_KEY=key-abc\n\
            trailing noise\n";

        let data = BenchmarkData::parse(output).unwrap();
        assert_eq!(data.flow_id(), "flow-xyz");
        assert_eq!(data.api_key(), "key-abc");
    }

    #[test]
    fn rejects_incomplete_output() {
        let err = BenchmarkData::parse("BENCHMARK_DATA:FLOW_ID=flow-xyz\n").unwrap_err();
        assert!(matches!(err, ParseError::Missing("API_KEY")));

        let err = BenchmarkData::parse("BENCHMARK_DATA:FLOW_ID=\nBENCHMARK_DATA:API_KEY=k\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Missing("FLOW_ID")));
    }

    #[test]
    fn debug_hides_api_key() {
        let data = BenchmarkData::new("flow-xyz", "key-abc").unwrap();
        let debug = format!("{data:?}");
        assert!(debug.contains("flow-xyz"));
        assert!(!debug.contains("key-abc"));
    }
}
