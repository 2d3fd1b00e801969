//! Scenario generation from project documents

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use tracing::info;

use uatbot_common::Database;
use uatbot_llm::{LlmClient, LlmConfig};

use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Requirements document (plain text)
    #[arg(long)]
    prd: PathBuf,

    /// Design reference notes (plain text)
    #[arg(long)]
    design: Option<PathBuf>,

    /// Code reference (plain text)
    #[arg(long)]
    code: Option<PathBuf>,

    /// Also generate and print testing-strategy insights
    #[arg(long)]
    insights: bool,

    /// Write generated scenarios as YAML files into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

pub async fn execute(args: GenerateArgs, db_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let prd_content = std::fs::read_to_string(&args.prd)
        .with_context(|| format!("reading {}", args.prd.display()))?;

    let client = LlmClient::new(LlmConfig::from_env())?;

    // Full pipeline when design and code references are present, otherwise
    // generate straight from the PRD.
    let drafts = match (&args.design, &args.code) {
        (Some(design_path), Some(code_path)) => {
            let design_content = std::fs::read_to_string(design_path)
                .with_context(|| format!("reading {}", design_path.display()))?;
            let code_content = std::fs::read_to_string(code_path)
                .with_context(|| format!("reading {}", code_path.display()))?;

            info!("Analyzing requirements document");
            let prd = client.analyze_prd(&prd_content).await?;
            info!("Analyzing design reference");
            let design = client.analyze_design(&design_content).await?;
            info!("Analyzing code reference");
            let code = client.analyze_code(&code_content).await?;

            if args.insights {
                let insights = client.generate_insights(&prd, &design, &code).await?;
                for insight in &insights {
                    println!(
                        "{} [{:?}/{:?}] {}",
                        "insight".cyan(),
                        insight.kind,
                        insight.severity,
                        insight.title
                    );
                    println!("  {}", insight.description);
                }
            }

            info!("Generating scenarios");
            client.generate_scenarios(&prd, &design, &code).await?
        }
        _ => {
            info!("Generating scenarios from the requirements document only");
            client.generate_scenarios_from_prd(&prd_content).await?
        }
    };

    let db = Database::open(db_path)?;
    let mut scenarios = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let scenario = draft.into_scenario();
        db.insert_scenario(&scenario)?;
        scenarios.push(scenario);
    }

    if let Some(out_dir) = &args.out_dir {
        std::fs::create_dir_all(out_dir)?;
        for scenario in &scenarios {
            let path = out_dir.join(format!("{}.yaml", scenario.id));
            std::fs::write(&path, serde_yaml::to_string(scenario)?)?;
        }
        info!("Wrote {} scenario file(s) to {}", scenarios.len(), out_dir.display());
    }

    match format {
        OutputFormat::Table => {
            println!("{}", output::scenario_table(&scenarios));
            println!("Generated {} scenario(s)", scenarios.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&scenarios)?);
        }
    }

    Ok(())
}
