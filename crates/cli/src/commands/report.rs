//! Re-render the report for a stored batch
//!
//! The report is a pure projection of stored execution results, so it can be
//! regenerated for any batch at any time.

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;

use uatbot_common::{BatchReport, Database};
use uatbot_engine::report;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Batch id to render (defaults to the most recent batch)
    #[arg(long)]
    batch: Option<String>,

    /// Write the rendered report to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn execute(args: ReportArgs, db_path: &Path) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;

    let batch_id = match args.batch {
        Some(id) => id,
        None => match db.latest_batch_id()? {
            Some(id) => id,
            None => bail!("no executions recorded yet"),
        },
    };

    let results = db.executions_for_batch(&batch_id)?;
    if results.is_empty() {
        bail!("batch {} not found", batch_id);
    }

    let rendered = report::render(&BatchReport::from_results(results));

    match args.out {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(())
}
