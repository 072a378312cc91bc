//! Job file model: the YAML shape of a job and its per-kind defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub version: String,
    pub job: String,
    pub kind: JobKind,
    #[serde(default)]
    pub input: InputConfig,
    pub output: OutputConfig,
    pub service: ServiceConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub suggest: SuggestSettings,
    #[serde(default)]
    pub procurement: ProcurementSettings,
    #[serde(default)]
    pub extract: ExtractSettings,
}

impl JobConfig {
    /// Rename map in effect: the explicit one, or the kind's default.
    #[must_use]
    pub fn rename_map(&self) -> BTreeMap<String, String> {
        self.input
            .rename
            .clone()
            .unwrap_or_else(|| self.kind.default_rename())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Ranked emission-factor suggestions for free-text items.
    Suggest,
    /// Multi-leg freight emissions per shipment.
    Freight,
    /// Spend-based emissions, sent in batches.
    Procurement,
    /// Paged search export with a grouped summary.
    Extract,
}

impl JobKind {
    /// Whether the kind enriches an input table row by row.
    #[must_use]
    pub fn reads_input(self) -> bool {
        !matches!(self, Self::Extract)
    }

    /// Canonical fields the kind's request builder reads.
    #[must_use]
    pub fn canonical_fields(self) -> &'static [&'static str] {
        match self {
            Self::Suggest => &[
                "text",
                "model",
                "unit_type",
                "year",
                "region",
                "region_fallback",
                "source",
                "exclude_source",
                "source_lca_activity",
            ],
            Self::Freight => &[
                "start",
                "destination",
                "main_mode_of_transport",
                "vehicle_type",
                "cargo_weight",
                "cargo_weight_unit",
            ],
            Self::Procurement => &[
                "money",
                "money_unit",
                "spend_year",
                "spend_region",
                "activity_id",
                "classification_code",
            ],
            Self::Extract => &[],
        }
    }

    /// Column headers expected in exported source files.
    #[must_use]
    pub fn default_rename(self) -> BTreeMap<String, String> {
        let pairs: &[(&str, &str)] = match self {
            Self::Suggest => &[
                ("TEXT", "text"),
                ("MODEL", "model"),
                ("UNIT_TYPE", "unit_type"),
                ("YEAR", "year"),
                ("REGION", "region"),
                ("REGION_FALLBACK", "region_fallback"),
                ("SOURCE", "source"),
                ("EXCLUDE_SOURCE", "exclude_source"),
                ("LCA_ACTIVITY", "source_lca_activity"),
            ],
            Self::Freight => &[
                ("START", "start"),
                ("DESTINATION", "destination"),
                ("MAIN_TYPE_OF_TRANSPORT", "main_mode_of_transport"),
                ("VEHICLE_TYPE", "vehicle_type"),
                ("WEIGHT", "cargo_weight"),
                ("WEIGHT_UNIT", "cargo_weight_unit"),
            ],
            Self::Procurement => &[
                ("SPEND_AMOUNT", "money"),
                ("CURRENCY", "money_unit"),
                ("SPEND_YEAR", "spend_year"),
                ("SPEND_REGION", "spend_region"),
                ("MAPPED_ACTIVITY", "activity_id"),
                ("INDUSTRY_CODE", "classification_code"),
            ],
            Self::Extract => &[],
        };
        pairs
            .iter()
            .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
            .collect()
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Suggest => "suggest",
            Self::Freight => "freight",
            Self::Procurement => "procurement",
            Self::Extract => "extract",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    /// External column name -> canonical field name.
    pub rename: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// JSON-lines report of failed rows.
    pub failures: Option<PathBuf>,
    /// Grouped table written by `extract` jobs.
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub token: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub use_env_proxy: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_no_match_codes")]
    pub no_match_codes: Vec<String>,
}

fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    500
}
fn default_pacing_ms() -> u64 {
    200
}
fn default_no_match_codes() -> Vec<String> {
    vec!["no_emission_factors_found".to_string()]
}

impl DispatchConfig {
    #[must_use]
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            pacing_ms: default_pacing_ms(),
            no_match_codes: default_no_match_codes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestSettings {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// `unspsc`, `nace2`, `mcc`, ... When unset, rows reference `activity_id`.
    pub classification_type: Option<String>,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Conversion factors into `base_currency` for unsupported currencies.
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

pub const MAX_BATCH_SIZE: usize = 100;

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}
fn default_base_currency() -> String {
    "eur".to_string()
}

impl Default for ProcurementSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            classification_type: None,
            base_currency: default_base_currency(),
            rates: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSettings {
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    /// Search filters; empty values are skipped.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(default = "default_group_by")]
    pub group_by: Vec<String>,
    #[serde(default = "default_fold")]
    pub fold: Vec<String>,
    #[serde(default = "default_fold_delimiter")]
    pub fold_delimiter: String,
}

fn default_results_per_page() -> u32 {
    500
}
fn default_group_by() -> Vec<String> {
    ["activity_id", "name", "category", "sector"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
fn default_fold() -> Vec<String> {
    vec!["source".to_string(), "unit_type".to_string()]
}
fn default_fold_delimiter() -> String {
    ",".to_string()
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
            filters: BTreeMap::new(),
            group_by: default_group_by(),
            fold: default_fold(),
            fold_delimiter: default_fold_delimiter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_suggest_job() {
        let yaml = r#"
version: "1.0"
job: supplier_items
kind: suggest

input:
  path: items.csv

output:
  path: items_enriched.csv

service:
  endpoint: https://api.example.test/autopilot/suggest
  token: secret
"#;
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.job, "supplier_items");
        assert_eq!(config.kind, JobKind::Suggest);
        assert_eq!(config.input.path, Some(PathBuf::from("items.csv")));
        // Defaults applied
        assert_eq!(config.dispatch.max_retries, 3);
        assert_eq!(config.dispatch.backoff_base_ms, 500);
        assert_eq!(config.dispatch.pacing(), Duration::from_millis(200));
        assert_eq!(config.dispatch.no_match_codes, vec!["no_emission_factors_found"]);
        assert_eq!(config.suggest.max_suggestions, 5);
        assert_eq!(config.service.timeout_seconds, 30);
        assert!(config.service.use_env_proxy);
        assert_eq!(config.rename_map()["TEXT"], "text");
    }

    #[test]
    fn test_deserialize_full_procurement_job() {
        let yaml = r#"
version: "1.0"
job: spend_2024
kind: procurement

input:
  path: spend.csv
  rename:
    Amount: money
    Currency: money_unit

output:
  path: spend_out.csv
  failures: spend_failures.jsonl

service:
  endpoint: https://api.example.test/procurement/v1/spend/batch
  token: secret
  timeout_seconds: 60

dispatch:
  max_retries: 5
  backoff_base_ms: 100
  pacing_ms: 0

procurement:
  batch_size: 50
  classification_type: unspsc
  rates:
    xyz: 0.25
"#;
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind, JobKind::Procurement);
        assert_eq!(config.rename_map().len(), 2);
        assert_eq!(config.procurement.batch_size, 50);
        assert_eq!(config.procurement.classification_type.as_deref(), Some("unspsc"));
        assert_eq!(config.procurement.base_currency, "eur");
        assert!((config.procurement.rates["xyz"] - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.dispatch.max_retries, 5);
        assert_eq!(config.dispatch.pacing(), Duration::ZERO);
        assert_eq!(
            config.output.failures,
            Some(PathBuf::from("spend_failures.jsonl"))
        );
    }

    #[test]
    fn test_extract_defaults() {
        let settings = ExtractSettings::default();
        assert_eq!(settings.results_per_page, 500);
        assert_eq!(settings.group_by, vec!["activity_id", "name", "category", "sector"]);
        assert_eq!(settings.fold, vec!["source", "unit_type"]);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = r#"
version: "1.0"
job: x
kind: teleport
output:
  path: out.csv
service:
  endpoint: https://api.example.test
  token: t
"#;
        assert!(serde_yaml::from_str::<JobConfig>(yaml).is_err());
    }
}
