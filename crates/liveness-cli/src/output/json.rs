//! JSON output adapter.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use liveness_core::{ReportOutput, SessionEvent, SessionObserver, SessionReport};
use serde::Serialize;
use tracing::warn;

/// JSON output adapter for reports and session events.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Creates a new JSON output writing to the given writer.
    #[allow(dead_code)] // API for programmatic use
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes the report as a standalone JSON document.
    pub fn write_document(&self, report: &SessionReport, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        self.write_line(&json)
    }

    fn write_value(&self, value: &impl Serialize) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.write_line(&json)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, line: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{line}")?;
        Ok(())
    }
}

impl ReportOutput for JsonOutput {
    fn write(&self, report: &SessionReport) -> Result<()> {
        self.write_value(report)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

impl SessionObserver for JsonOutput {
    fn on_event(&self, event: &SessionEvent) {
        if let Err(e) = self.write_value(event) {
            warn!("Failed to write session event: {e:#}");
        }
    }
}
