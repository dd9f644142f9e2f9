//! Report output port for writing session reports.

use crate::domain::SessionReport;

/// Port for outputting session reports.
pub trait ReportOutput: Send + Sync {
    /// Writes a single session report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &SessionReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
