use super::ReportRow;
use crate::error::Result;

/// Consumer of report rows.
///
/// Rows arrive as they are produced: matched pairs while the captures are
/// being read, then unmatched packets once both are exhausted.
pub trait ReportSink {
    fn emit(&mut self, row: ReportRow) -> Result<()>;

    /// Called once after the last row.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects rows in memory.
impl ReportSink for Vec<ReportRow> {
    fn emit(&mut self, row: ReportRow) -> Result<()> {
        self.push(row);
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, row: ReportRow) -> Result<()> {
        (**self).emit(row)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
