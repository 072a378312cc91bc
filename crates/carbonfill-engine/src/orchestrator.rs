//! Job orchestrator: loads the input, builds and dispatches requests, merges
//! results, and writes the output files.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use carbonfill_types::{JobName, Outcome, RowCounts, RowResult, Table, ValidationFailure};
use serde_json::Value;

use crate::aggregate::{aggregate_pages, group_records, records_to_table, SearchFetcher};
use crate::config::types::{JobConfig, JobKind};
use crate::csv_io::{read_headers, read_table, write_table};
use crate::currency::StaticRates;
use crate::dispatch::Dispatcher;
use crate::execution::{DryRunResult, ExecutionOptions, JobOutcome, PlannedRequest};
use crate::failures::{row_failure, write_failure_report};
use crate::merge::{
    split_batch_outcome, FreightMapper, ProcurementMapper, SlotBuffer, SuccessMapper,
    SuggestMapper,
};
use crate::normalize::normalize_table;
use crate::request::{
    build_freight, build_procurement_item, build_search_query, build_suggest, into_batches,
    ActivityReference,
};
use crate::result::{CheckResult, JobResult};

/// Requests for a table, in row order, plus the rows that failed validation.
struct RequestPlan {
    requests: Vec<PlannedRequest>,
    invalid: Vec<(usize, ValidationFailure)>,
}

/// Run a job end to end.
///
/// Row-level failures never abort the run; they are written into the row's
/// output slots. Only resource-level failures are returned as errors.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the output cannot be
/// written, or (for `extract`) any search page fails.
pub async fn run_job(config: &JobConfig, options: &ExecutionOptions) -> Result<JobOutcome> {
    tracing::info!(
        job = config.job,
        kind = %config.kind,
        dry_run = options.dry_run,
        "Starting job run"
    );
    match config.kind {
        JobKind::Extract => run_extract(config, options).await,
        JobKind::Suggest | JobKind::Freight | JobKind::Procurement => {
            run_rows(config, options).await
        }
    }
}

fn load_input(config: &JobConfig, options: &ExecutionOptions) -> Result<Table> {
    let path = config
        .input
        .path
        .as_deref()
        .context("input.path is not set")?;
    let raw = read_table(path).with_context(|| format!("Failed to read input {}", path.display()))?;
    let mut table = normalize_table(raw, &config.rename_map(), config.kind.canonical_fields());
    if let Some(limit) = options.limit {
        table.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    Ok(table)
}

fn plan_requests(config: &JobConfig, table: &Table) -> RequestPlan {
    let mut requests = Vec::new();
    let mut invalid = Vec::new();

    match config.kind {
        JobKind::Suggest | JobKind::Freight => {
            for row in table.iter_rows() {
                let built = if config.kind == JobKind::Suggest {
                    build_suggest(&row, config.suggest.max_suggestions)
                } else {
                    build_freight(&row)
                };
                match built {
                    Ok(payload) => requests.push(PlannedRequest {
                        rows: vec![row.index()],
                        payload,
                    }),
                    Err(failure) => invalid.push((row.index(), failure)),
                }
            }
        }
        JobKind::Procurement => {
            let reference =
                ActivityReference::from_scheme(config.procurement.classification_type.as_deref());
            let rates = StaticRates::from_settings(&config.procurement);
            let mut items = Vec::new();
            for row in table.iter_rows() {
                match build_procurement_item(&row, &reference, &rates) {
                    Ok(item) => items.push((row.index(), item)),
                    Err(failure) => invalid.push((row.index(), failure)),
                }
            }
            requests = into_batches(items, config.procurement.batch_size)
                .into_iter()
                .map(|batch| PlannedRequest {
                    rows: batch.rows,
                    payload: batch.payload,
                })
                .collect();
        }
        JobKind::Extract => {}
    }

    RequestPlan { requests, invalid }
}

/// Slot mapper for a row-enriching job. `extract` merges no rows.
fn mapper_for(config: &JobConfig) -> Option<Box<dyn SuccessMapper>> {
    match config.kind {
        JobKind::Suggest => Some(Box::new(SuggestMapper {
            max_suggestions: config.suggest.max_suggestions,
        })),
        JobKind::Freight => Some(Box::new(FreightMapper)),
        JobKind::Procurement => Some(Box::new(ProcurementMapper)),
        JobKind::Extract => None,
    }
}

async fn run_rows(config: &JobConfig, options: &ExecutionOptions) -> Result<JobOutcome> {
    let start = Instant::now();
    let mapper = mapper_for(config)
        .with_context(|| format!("{} jobs do not enrich rows", config.kind))?;
    let mut table = load_input(config, options)?;
    let plan = plan_requests(config, &table);
    tracing::info!(
        job = config.job,
        rows = table.len(),
        requests = plan.requests.len(),
        invalid = plan.invalid.len(),
        "Planned requests"
    );

    if options.dry_run {
        return Ok(JobOutcome::DryRun(DryRunResult {
            requests: plan.requests,
            invalid_rows: plan.invalid.iter().map(|(row, _)| *row).collect(),
        }));
    }

    let dispatcher = Dispatcher::new(&config.service, &config.dispatch)?;
    let mut results: Vec<Option<RowResult>> = vec![None; table.len()];
    for (row, failure) in plan.invalid {
        results[row] = Some(RowResult::MissingRequired(failure));
    }

    for request in &plan.requests {
        let outcome = dispatcher.post_json(&request.payload).await;
        dispatcher.pace().await;
        if config.kind == JobKind::Procurement {
            let split = split_batch_outcome(&request.rows, &outcome, dispatcher.no_match_codes());
            for (row, item) in split {
                results[row] = Some(RowResult::Dispatched(item));
            }
        } else {
            for row in &request.rows {
                results[*row] = Some(RowResult::Dispatched(outcome.clone()));
            }
        }
    }

    let mut buffer = SlotBuffer::new(mapper.layout(), table.len());
    let mut counts = RowCounts::default();
    let mut failures = Vec::new();
    for (row, result) in results.into_iter().enumerate() {
        let result = result
            .unwrap_or_else(|| RowResult::Dispatched(Outcome::unexpected("row was not processed")));
        let failure = buffer.merge_row(row, &result, mapper.as_ref());
        counts.record(failure.as_ref().map(|f| f.marker));
        if let Some(failure) = failure {
            tracing::warn!(
                row,
                marker = %failure.marker,
                detail = failure.detail.as_str(),
                "Row not enriched"
            );
            failures.push(row_failure(row, &failure));
        }
    }

    buffer.merge_into(&mut table);
    write_table(&config.output.path, &table)
        .with_context(|| format!("Failed to write output {}", config.output.path.display()))?;
    if let Some(ref path) = config.output.failures {
        write_failure_report(path, &failures);
    }

    let stats = dispatcher.stats();
    let duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        job = config.job,
        rows = counts.rows,
        enriched = counts.enriched,
        failed = counts.failed(),
        requests = stats.requests,
        retries = stats.retries,
        duration_secs,
        "Job run complete"
    );

    Ok(JobOutcome::Run(JobResult {
        job: JobName::new(config.job.clone()),
        kind: config.kind,
        counts,
        requests: stats.requests,
        retries: stats.retries,
        pages: 0,
        output: config.output.path.clone(),
        summary: None,
        duration_secs,
    }))
}

async fn run_extract(config: &JobConfig, options: &ExecutionOptions) -> Result<JobOutcome> {
    let start = Instant::now();
    let settings = &config.extract;
    let page_limit = options
        .limit
        .map(|limit| u32::try_from(limit).unwrap_or(u32::MAX));

    if options.dry_run {
        let query: serde_json::Map<String, Value> = build_search_query(settings, 1)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        return Ok(JobOutcome::DryRun(DryRunResult {
            requests: vec![PlannedRequest {
                rows: Vec::new(),
                payload: Value::Object(query),
            }],
            invalid_rows: Vec::new(),
        }));
    }

    let summary_path = config
        .output
        .summary
        .as_deref()
        .context("output.summary is not set")?;

    let dispatcher = Dispatcher::new(&config.service, &config.dispatch)?;
    let fetcher = SearchFetcher::new(&dispatcher, settings);
    let aggregation = aggregate_pages(&fetcher, page_limit)
        .await
        .context("Emission factor export failed")?;

    let records = records_to_table(&aggregation.records);
    write_table(&config.output.path, &records)
        .with_context(|| format!("Failed to write output {}", config.output.path.display()))?;
    let grouped = group_records(
        &records,
        &settings.group_by,
        &settings.fold,
        &settings.fold_delimiter,
    );
    write_table(summary_path, &grouped)
        .with_context(|| format!("Failed to write summary {}", summary_path.display()))?;

    let record_count = u64::try_from(records.len()).unwrap_or(u64::MAX);
    let counts = RowCounts {
        rows: record_count,
        enriched: record_count,
        ..RowCounts::default()
    };
    let stats = dispatcher.stats();
    let duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        job = config.job,
        pages = aggregation.pages_fetched,
        records = records.len(),
        groups = grouped.len(),
        duration_secs,
        "Export complete"
    );

    Ok(JobOutcome::Run(JobResult {
        job: JobName::new(config.job.clone()),
        kind: config.kind,
        counts,
        requests: stats.requests,
        retries: stats.retries,
        pages: aggregation.pages_fetched,
        output: config.output.path.clone(),
        summary: Some(summary_path.to_path_buf()),
        duration_secs,
    }))
}

/// Check that the input file exists and carries the declared columns.
///
/// # Errors
///
/// Returns an error if the input header cannot be read.
pub fn check_job(config: &JobConfig) -> Result<CheckResult> {
    tracing::info!(job = config.job, kind = %config.kind, "Checking job configuration");
    if !config.kind.reads_input() {
        return Ok(CheckResult::default());
    }
    let path: &Path = config
        .input
        .path
        .as_deref()
        .context("input.path is not set")?;
    let headers =
        read_headers(path).with_context(|| format!("Failed to read input {}", path.display()))?;

    let rename = config.rename_map();
    let available: Vec<&str> = headers
        .iter()
        .map(|h| rename.get(h).map_or(h.as_str(), String::as_str))
        .collect();
    let missing_fields = config
        .kind
        .canonical_fields()
        .iter()
        .filter(|field| !available.contains(*field))
        .map(|field| (*field).to_string())
        .collect();

    Ok(CheckResult {
        input_columns: headers.len(),
        missing_fields,
    })
}
