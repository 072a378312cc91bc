use std::path::Path;

use anyhow::{Context, Result};

use carbonfill_engine::config::{parser, validator};
use carbonfill_engine::{run_job, DryRunResult, ExecutionOptions, JobOutcome, JobResult};

/// Execute the `run` command: parse, validate, and run a job.
pub async fn execute(job_path: &Path, dry_run: bool, limit: Option<u64>) -> Result<()> {
    let config = parser::parse_job(job_path)
        .with_context(|| format!("Failed to parse job: {}", job_path.display()))?;

    validator::validate_job(&config)?;

    tracing::info!(
        job = config.job,
        kind = %config.kind,
        endpoint = config.service.endpoint,
        "Job validated"
    );

    let options = ExecutionOptions { dry_run, limit };
    match run_job(&config, &options).await? {
        JobOutcome::Run(result) => print_result(&result),
        JobOutcome::DryRun(result) => print_dry_run(&result)?,
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_result(result: &JobResult) {
    let counts = &result.counts;
    println!("Job '{}' ({}) completed.", result.job, result.kind);
    if result.pages > 0 {
        println!("  Pages fetched:   {}", result.pages);
        println!("  Records:         {}", counts.rows);
    } else {
        println!("  Rows:            {}", counts.rows);
        println!("  Enriched:        {}", counts.enriched);
        println!("  Missing fields:  {}", counts.missing_required);
        println!("  No match:        {}", counts.no_match);
        println!("  API errors:      {}", counts.api_error);
        println!("  Errors:          {}", counts.error);
    }
    println!("  Requests:        {}", result.requests);
    if result.retries > 0 {
        println!("  Retries:         {}", result.retries);
    }
    println!("  Output:          {}", result.output.display());
    if let Some(summary) = &result.summary {
        println!("  Summary:         {}", summary.display());
    }
    println!("  Duration:        {:.2}s", result.duration_secs);
    if result.duration_secs > 0.0 && result.requests > 0 {
        println!(
            "  Throughput:      {:.1} requests/sec",
            result.requests as f64 / result.duration_secs
        );
    }

    // Machine-readable line for scripts
    let json = serde_json::json!({
        "job": result.job,
        "kind": result.kind,
        "counts": counts,
        "requests": result.requests,
        "retries": result.retries,
        "pages": result.pages,
        "duration_secs": result.duration_secs,
    });
    println!("@@RUN_JSON@@{json}");
}

fn print_dry_run(result: &DryRunResult) -> Result<()> {
    for request in &result.requests {
        let rows = request
            .rows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let payload = serde_json::to_string(&request.payload)?;
        println!("rows {rows}: {payload}");
    }
    println!(
        "Dry run: {} request(s) planned, {} row(s) missing required fields.",
        result.requests.len(),
        result.invalid_rows.len()
    );
    Ok(())
}
