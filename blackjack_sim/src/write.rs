use crate::stats::SimulationSummary;
use crate::SimulationError;
use std::io::Write;

/// How a summary is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A public function to take a `SimulationSummary` and write it to a writer, as a text table or pretty printed JSON.
pub fn write(
    summary: &SimulationSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> Result<(), SimulationError> {
    match format {
        OutputFormat::Text => writeln!(writer, "{}", summary)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, summary)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
