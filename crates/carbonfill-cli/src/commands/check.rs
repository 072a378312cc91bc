use std::path::Path;

use anyhow::{Context, Result};

use carbonfill_engine::check_job;
use carbonfill_engine::config::{parser, validator};

/// Execute the `check` command: validate the job file and its input header.
pub fn execute(job_path: &Path) -> Result<()> {
    let config = parser::parse_job(job_path)
        .with_context(|| format!("Failed to parse job: {}", job_path.display()))?;

    validator::validate_job(&config)?;
    println!("Job structure:     OK");

    let result = check_job(&config)?;
    if !config.kind.reads_input() {
        println!("Input:             not used by {} jobs", config.kind);
        return Ok(());
    }

    println!("Input columns:     {}", result.input_columns);
    if result.missing_fields.is_empty() {
        println!("Field mapping:     OK");
        println!("\nAll checks passed.");
        return Ok(());
    }

    println!("Field mapping:     WARNING");
    for field in &result.missing_fields {
        println!("  no column for '{field}'");
    }
    println!("\nMissing fields are sent empty; rows lacking a required one are not dispatched.");
    Ok(())
}
