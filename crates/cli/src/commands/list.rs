//! List stored scenarios

use std::path::Path;

use uatbot_common::Database;

use crate::output::{self, OutputFormat};

pub fn execute(db_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let scenarios = db.list_scenarios()?;

    match format {
        OutputFormat::Table => {
            println!("{}", output::scenario_table(&scenarios));
            println!("{} scenario(s)", scenarios.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&scenarios)?);
        }
    }

    Ok(())
}
