//! Batch execution against a running application

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use uatbot_common::{Database, RunStatus, Scenario, ScenarioStatus};
use uatbot_engine::visual::{BaselineComparer, VisualConfig};
use uatbot_engine::{report, BatchConfig, BatchRunner, SessionConfig};

use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Base URL of the application under test
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Run scenarios from YAML files in this directory instead of the store
    #[arg(long)]
    scenarios_dir: Option<PathBuf>,

    /// Run only the stored scenario with this id
    #[arg(long)]
    id: Option<String>,

    /// Directory screenshot artifacts are written to
    #[arg(long, default_value = "uploads")]
    screenshot_dir: PathBuf,

    /// Output directory for result JSON and the rendered report
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Compare captured screenshots against stored baselines
    #[arg(long)]
    visual_check: bool,

    /// Adopt captured screenshots as baselines when none exist
    #[arg(long)]
    update_baselines: bool,
}

pub async fn execute(args: RunArgs, db_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;

    let scenarios = load_scenarios(&args, &db)?;
    if scenarios.is_empty() {
        bail!("no scenarios to run; generate some first or pass --scenarios-dir");
    }

    let runner = BatchRunner::with_config(BatchConfig {
        base_url: args.base_url.clone(),
        session: SessionConfig {
            headless: !args.headed,
            screenshot_dir: args.screenshot_dir.clone(),
            ..Default::default()
        },
        output_dir: args.output.clone(),
    });

    // Ctrl-C stops the batch at the next suspension point; whatever already
    // ran is still reported.
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling batch");
            ctrl_c_token.cancel();
        }
    });

    let batch_id = uuid::Uuid::new_v4().to_string();
    info!("Starting batch {}", batch_id);

    let batch_report = runner.run(&scenarios, &cancel).await?;

    // Persist outcomes; scenarios loaded from files are not in the store
    for result in &batch_report.results {
        db.insert_execution(&batch_id, result)?;

        if result.status != RunStatus::Skipped {
            let status = match result.status {
                RunStatus::Passed => ScenarioStatus::Passed,
                _ => ScenarioStatus::Failed,
            };
            match db.record_outcome(&result.scenario_id, status, result.actual_results.as_deref())
            {
                Ok(()) | Err(uatbot_common::Error::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    runner.write_results(&batch_report)?;

    let rendered = report::render(&batch_report);
    let report_path = args.output.join("report.md");
    std::fs::write(&report_path, &rendered)
        .with_context(|| format!("writing {}", report_path.display()))?;
    info!("Report written to: {}", report_path.display());

    if args.visual_check {
        run_visual_check(&args, &batch_report)?;
    }

    match format {
        OutputFormat::Table => {
            println!("{}", output::result_table(&batch_report));
            output::print_batch_summary(&batch_report);
            println!("Batch id: {batch_id}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&batch_report)?);
        }
    }

    if batch_report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn load_scenarios(args: &RunArgs, db: &Database) -> anyhow::Result<Vec<Scenario>> {
    if let Some(dir) = &args.scenarios_dir {
        return Ok(Scenario::load_all(dir)?);
    }
    if let Some(id) = &args.id {
        return match db.get_scenario(id)? {
            Some(scenario) => Ok(vec![scenario]),
            None => bail!("scenario {} not found", id),
        };
    }
    Ok(db.list_scenarios()?)
}

/// Advisory check of captured screenshots against baselines; mismatches are
/// printed but never change the batch verdict.
fn run_visual_check(
    args: &RunArgs,
    batch_report: &uatbot_common::BatchReport,
) -> anyhow::Result<()> {
    let comparer = BaselineComparer::new(VisualConfig {
        captured_dir: args.screenshot_dir.clone(),
        adopt_missing: args.update_baselines,
        ..Default::default()
    })?;

    for result in &batch_report.results {
        for shot in &result.screenshots {
            match comparer.compare(shot) {
                Ok(diff) if !diff.matches => {
                    warn!("Visual mismatch: {} ({:.2}% differs)", shot, diff.diff_percent);
                }
                Ok(_) => {}
                Err(uatbot_engine::EngineError::BaselineNotFound(_)) => {
                    info!("No baseline yet for {}", shot);
                }
                Err(e) => warn!("Visual comparison failed for {}: {}", shot, e),
            }
        }
    }

    Ok(())
}
