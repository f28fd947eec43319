//! Leveled diagnostics tagged with the file and record being decoded.
//!
//! Every report is emitted as a `tracing` event and also kept in memory so
//! front-ends can list what went wrong with a given NewGRF.

use std::fmt;

use tracing::{error, info, warn};

/// How bad a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Notice,
    Warning,
    Error,
    /// Reserved for conditions that stop the whole load.
    Fatal,
}

impl Severity {
    /// Map the severity byte used by error pseudo-sprites.
    pub fn from_grf(level: u8) -> Self {
        match level & 0x7F {
            0 => Severity::Notice,
            1 => Severity::Warning,
            2 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the file being decoded.
    pub file: String,
    /// Index of the record within that file (0 is the header).
    pub record: u32,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}: {}",
            self.file, self.record, self.severity, self.message
        )
    }
}

/// Diagnostics sink owned by the loader.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    file: String,
    record: u32,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file and record that subsequent reports refer to.
    pub fn set_location(&mut self, file: &str, record: u32) {
        if self.file != file {
            self.file.clear();
            self.file.push_str(file);
        }
        self.record = record;
    }

    pub fn set_record(&mut self, record: u32) {
        self.record = record;
    }

    pub fn report(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Notice => info!(file = %self.file, record = self.record, "{message}"),
            Severity::Warning => warn!(file = %self.file, record = self.record, "{message}"),
            Severity::Error | Severity::Fatal => {
                error!(file = %self.file, record = self.record, %severity, "{message}")
            }
        }
        self.entries.push(Diagnostic {
            file: self.file.clone(),
            record: self.record,
            severity,
            message,
        });
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.report(Severity::Notice, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.report(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message);
    }

    pub fn fatal(&mut self, message: impl Into<String>) {
        self.report(Severity::Fatal, message);
    }

    /// All messages in the order they were reported.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of messages at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.message.contains(needle))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.file.clear();
        self.record = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_carry_location() {
        let mut d = Diagnostics::new();
        d.set_location("trains.grf", 12);
        d.warn("unknown property 0x42");
        d.set_record(13);
        d.notice("comment");

        let e = d.entries();
        assert_eq!(e.len(), 2);
        assert_eq!(e[0].file, "trains.grf");
        assert_eq!(e[0].record, 12);
        assert_eq!(e[1].record, 13);
        assert_eq!(d.count(Severity::Warning), 1);
        assert_eq!(e[0].to_string(), "[trains.grf:12] warning: unknown property 0x42");
    }

    #[test]
    fn grf_severity_ignores_stage_bit() {
        assert_eq!(Severity::from_grf(0x80), Severity::Notice);
        assert_eq!(Severity::from_grf(0x02), Severity::Error);
        assert_eq!(Severity::from_grf(0x83), Severity::Fatal);
    }
}
