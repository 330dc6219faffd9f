//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard
//! route service. All types derive Serde traits for deserialization from
//! config files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filters::{DateRange, NamedDateRange};
use crate::views::ViewKind;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// HTTP API settings.
    pub server: ServerConfig,

    /// Outbound LAPIS client settings.
    pub lapis: LapisConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Organism view definitions. Replaces the built-in list when present.
    pub organisms: Vec<OrganismConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            lapis: LapisConfig::default(),
            observability: ObservabilityConfig::default(),
            organisms: builtin_organisms(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// LAPIS client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LapisConfig {
    /// Timeout for a single LAPIS request in seconds.
    pub timeout_secs: u64,
}

impl Default for LapisConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Per-organism view definition.
///
/// Every organism shares the same view logic; this record carries all that
/// differs between them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrganismConfig {
    /// Stable identifier used in routes (e.g., "covid").
    pub key: String,

    /// Human-readable name.
    pub display_name: String,

    /// First path segment of every view of this organism.
    pub path_segment: String,

    /// Base URL of the organism's LAPIS instance.
    pub lapis_url: String,

    /// LAPIS date field; filters use `<date_field>From` / `<date_field>To`.
    pub date_field: String,

    /// Lower bound of the `allTimes` range.
    pub earliest_date: NaiveDate,

    /// Range applied when the URL carries none.
    #[serde(default = "default_date_range")]
    pub default_date_range: DateRange,

    /// Location fields, coarse to fine.
    pub location_fields: Vec<String>,

    /// Lineage or clade fields.
    pub lineage_fields: Vec<String>,

    /// Whether the free-text `variantQuery` is offered.
    #[serde(default)]
    pub advanced_queries: bool,

    /// Views offered for this organism.
    #[serde(default = "default_views")]
    pub views: Vec<ViewKind>,
}

fn default_date_range() -> DateRange {
    DateRange::Named(NamedDateRange::AllTimes)
}

fn default_views() -> Vec<ViewKind> {
    ViewKind::ALL.to_vec()
}

// Evaluated at compile time; a bad date fails the build.
const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid built-in date"),
    }
}

const COVID_EARLIEST: NaiveDate = ymd(2020, 1, 6);
const H5N1_EARLIEST: NaiveDate = ymd(1905, 1, 1);
const WEST_NILE_EARLIEST: NaiveDate = ymd(1930, 1, 1);
const RSV_EARLIEST: NaiveDate = ymd(1956, 1, 1);
const MPOX_EARLIEST: NaiveDate = ymd(1960, 1, 1);

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn pathoplexus_organism(
    key: &str,
    display_name: &str,
    earliest_date: NaiveDate,
    lineage_fields: &[&str],
) -> OrganismConfig {
    OrganismConfig {
        key: key.to_string(),
        display_name: display_name.to_string(),
        path_segment: key.to_string(),
        lapis_url: format!("https://lapis.pathoplexus.org/{}", key),
        date_field: "sampleCollectionDate".to_string(),
        earliest_date,
        default_date_range: default_date_range(),
        location_fields: strings(&["geoLocCountry", "geoLocAdmin1"]),
        lineage_fields: strings(lineage_fields),
        advanced_queries: false,
        views: default_views(),
    }
}

/// The organisms served when the config file does not list any.
pub fn builtin_organisms() -> Vec<OrganismConfig> {
    vec![
        OrganismConfig {
            key: "covid".to_string(),
            display_name: "SARS-CoV-2".to_string(),
            path_segment: "covid".to_string(),
            lapis_url: "https://lapis.cov-spectrum.org/open/v2".to_string(),
            date_field: "date".to_string(),
            earliest_date: COVID_EARLIEST,
            default_date_range: DateRange::Named(NamedDateRange::Last6Months),
            location_fields: strings(&["region", "country", "division"]),
            lineage_fields: strings(&["nextcladePangoLineage"]),
            advanced_queries: true,
            views: default_views(),
        },
        OrganismConfig {
            lapis_url: "https://lapis.genspectrum.org/h5n1".to_string(),
            ..pathoplexus_organism("h5n1", "Influenza A/H5N1", H5N1_EARLIEST, &["clade"])
        },
        pathoplexus_organism("west-nile", "West Nile Virus", WEST_NILE_EARLIEST, &["lineage"]),
        pathoplexus_organism("rsv-a", "RSV-A", RSV_EARLIEST, &["lineage"]),
        pathoplexus_organism("rsv-b", "RSV-B", RSV_EARLIEST, &["lineage"]),
        pathoplexus_organism("mpox", "Mpox", MPOX_EARLIEST, &["clade", "lineage"]),
    ]
}
