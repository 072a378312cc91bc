//! Semantic validation for parsed job configuration values.

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::config::types::{JobConfig, JobKind, MAX_BATCH_SIZE};

/// Validate the service endpoint URL and credentials.
fn validate_service(config: &JobConfig, errors: &mut Vec<String>) {
    match reqwest::Url::parse(config.service.endpoint.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.host_str().is_none() {
                errors.push(format!(
                    "service.endpoint '{}' has no host",
                    config.service.endpoint
                ));
            }
        }
        Ok(url) => errors.push(format!(
            "service.endpoint must use http or https, got '{}'",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "service.endpoint '{}' is not a valid URL: {e}",
            config.service.endpoint
        )),
    }

    if config.service.token.trim().is_empty() {
        errors.push("service.token must not be empty".to_string());
    }
    if config.service.timeout_seconds == 0 {
        errors.push("service.timeout_seconds must be > 0".to_string());
    }
}

/// Validate rename targets: canonical names must be unique and non-empty.
fn validate_rename(config: &JobConfig, errors: &mut Vec<String>) {
    let Some(ref rename) = config.input.rename else {
        return;
    };
    let mut seen = HashSet::new();
    for (from, to) in rename {
        if from.trim().is_empty() || to.trim().is_empty() {
            errors.push(format!("input.rename: empty column name in '{from}' -> '{to}'"));
            continue;
        }
        if !seen.insert(to.as_str()) {
            errors.push(format!(
                "input.rename: canonical field '{to}' is targeted more than once"
            ));
        }
    }
}

fn validate_kind_settings(config: &JobConfig, errors: &mut Vec<String>) {
    match config.kind {
        JobKind::Suggest => {
            if config.suggest.max_suggestions == 0 {
                errors.push("suggest.max_suggestions must be at least 1".to_string());
            }
        }
        JobKind::Freight => {}
        JobKind::Procurement => {
            let batch_size = config.procurement.batch_size;
            if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
                errors.push(format!(
                    "procurement.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
                ));
            }
            if config.procurement.base_currency.trim().is_empty() {
                errors.push("procurement.base_currency must not be empty".to_string());
            }
            if let Some(ref scheme) = config.procurement.classification_type {
                if scheme.trim().is_empty() {
                    errors.push("procurement.classification_type must not be empty".to_string());
                }
            }
            for (currency, rate) in &config.procurement.rates {
                if !rate.is_finite() || *rate <= 0.0 {
                    errors.push(format!(
                        "procurement.rates: rate for '{currency}' must be a positive number"
                    ));
                }
            }
        }
        JobKind::Extract => {
            if config.extract.results_per_page == 0 {
                errors.push("extract.results_per_page must be at least 1".to_string());
            }
            if config.extract.group_by.is_empty() {
                errors.push("extract.group_by must name at least one column".to_string());
            }
            if config.extract.fold_delimiter.is_empty() {
                errors.push("extract.fold_delimiter must not be empty".to_string());
            }
            if config.output.summary.is_none() {
                errors.push("extract jobs require output.summary".to_string());
            }
        }
    }
}

/// Validate a parsed job configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the job config.
pub fn validate_job(config: &JobConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported job version '{}', expected '1.0'",
            config.version
        ));
    }

    if config.job.trim().is_empty() {
        errors.push("Job name must not be empty".to_string());
    }

    if config.kind.reads_input() {
        let has_input = config
            .input
            .path
            .as_ref()
            .is_some_and(|p| !p.as_os_str().is_empty());
        if !has_input {
            errors.push(format!("{} jobs require input.path", config.kind));
        }
    }

    if config.output.path.as_os_str().is_empty() {
        errors.push("output.path must not be empty".to_string());
    }

    validate_service(config, &mut errors);
    validate_rename(config, &mut errors);
    validate_kind_settings(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("Job validation failed:\n  - {}", errors.join("\n  - "));
    }
}
