//! Typed dashboard filters.
//!
//! # Data Flow
//! ```text
//! query string fields
//!     → views::codec (field names per organism)
//!     → BaselineFilter (location + date range)
//!     → VariantFilter (structured lineage query | advanced query)
//!     → lapis::LapisFilter (external API shape)
//! ```
//!
//! # Design Decisions
//! - Filters are plain values; every change builds a new one
//! - Mutually exclusive shapes are enums, never inferred from present keys
//! - Filters carry no organism knowledge; field names come from config

pub mod date_range;
pub mod location;
pub mod variant;

use serde::{Deserialize, Serialize};

pub use date_range::{DateRange, DateRangeError, NamedDateRange};
pub use location::LocationFilter;
pub use variant::{LineageQuery, VariantFilter};

/// Location and date range part of a query, independent of variant selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineFilter {
    pub location: LocationFilter,
    pub date_range: DateRange,
}

impl BaselineFilter {
    /// A filter with no location restriction over the given range.
    pub fn new(date_range: DateRange) -> Self {
        Self {
            location: LocationFilter::default(),
            date_range,
        }
    }

    pub fn with_location(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.location.insert(field, value);
        self
    }
}

/// One column of a side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub baseline_filter: BaselineFilter,
    pub variant_filter: VariantFilter,
}

impl FilterGroup {
    pub fn new(baseline_filter: BaselineFilter, variant_filter: VariantFilter) -> Self {
        Self {
            baseline_filter,
            variant_filter,
        }
    }
}
