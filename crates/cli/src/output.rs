//! Terminal output helpers

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use uatbot_common::{BatchReport, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Render stored scenarios as a table
pub fn scenario_table(scenarios: &[Scenario]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Title", "Priority", "Type", "Steps", "Status"]);

    for scenario in scenarios {
        table.add_row(vec![
            scenario.id.clone(),
            scenario.title.clone(),
            scenario.priority.to_string(),
            scenario.scenario_type.to_string(),
            scenario.steps.len().to_string(),
            scenario.status.to_string(),
        ]);
    }

    table
}

/// Render batch outcomes as a table
pub fn result_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Scenario", "Status", "Duration (ms)", "Steps", "Error"]);

    for result in &report.results {
        table.add_row(vec![
            result.scenario_id.clone(),
            result.status.to_string(),
            result.duration_ms.to_string(),
            result.steps.len().to_string(),
            result.error.clone().unwrap_or_default(),
        ]);
    }

    table
}

/// One-line batch summary with colored counts
pub fn print_batch_summary(report: &BatchReport) {
    println!(
        "\n{} passed, {} failed, {} skipped ({} total, {:.1}% success)",
        report.passed.to_string().green(),
        report.failed.to_string().red(),
        report.skipped.to_string().yellow(),
        report.total,
        report.success_rate,
    );
}
