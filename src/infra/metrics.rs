// ============================================================
// Layer 6: Metrics Writer
// ============================================================
// Records scalar training metrics to a CSV file.
//
// Every row is one (step, tag, value) event, the same shape a
// summary writer emits, so the file can be plotted directly:
//
//   step,tag,value
//   0,loss,0.693147
//   1,loss,0.688002
//   ...
//
// Output file: <writer_dir>/metrics.csv

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One logged scalar, as read back from the CSV
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarEvent {
    /// Global training step the value belongs to
    pub step: usize,

    /// Name of the series, e.g. "loss"
    pub tag: String,

    pub value: f64,
}

/// Appends scalar events to a CSV file.
pub struct MetricsWriter {
    csv_path: PathBuf,
}

impl MetricsWriter {
    /// Create the writer, its directory, and the CSV header if the
    /// file does not exist yet. Existing files are appended to.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "step,tag,value")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn add_scalar(&self, tag: &str, value: f64, step: usize) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{},{:.6}", step, tag, value)?;
        tracing::debug!("scalar {}={:.4} at step {}", tag, value, step);
        Ok(())
    }
}

#[cfg(test)]
impl MetricsWriter {
    /// Parse every event back out of the CSV file.
    pub fn read_events(&self) -> Result<Vec<ScalarEvent>> {
        let text = fs::read_to_string(&self.csv_path)?;
        text.lines()
            .skip(1)
            .filter(|l| !l.is_empty())
            .map(|line| {
                let mut parts = line.splitn(3, ',');
                let (Some(step), Some(tag), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
                    anyhow::bail!("Malformed metrics row '{line}'");
                };
                Ok(ScalarEvent {
                    step:  step.parse()?,
                    tag:   tag.to_string(),
                    value: value.parse()?,
                })
            })
            .collect()
    }
}
