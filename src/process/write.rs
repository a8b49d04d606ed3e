use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{fs, path::Path};
use tracing::debug;

use crate::process::Table;

/// Write `table` as CSV (header row, no index column), creating parent
/// directories as needed.
#[tracing::instrument(level = "debug", skip(table, path), fields(path = %path.display()))]
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&table.headers).context("writing header row")?;
    for (i, row) in table.rows.iter().enumerate() {
        wtr.write_record(row.iter().map(|c| c.to_string()))
            .with_context(|| format!("writing row {}", i))?;
    }
    wtr.flush().with_context(|| format!("flushing {}", path.display()))?;

    debug!(rows = table.num_rows(), "written");
    Ok(())
}
