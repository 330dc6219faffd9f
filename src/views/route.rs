//! Parsed route values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filters::{BaselineFilter, FilterGroup, VariantFilter};

/// The page kinds every organism can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    SingleVariant,
    SequencingEfforts,
    CompareSideBySide,
    CompareVariants,
    CompareToBaseline,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::SingleVariant,
        ViewKind::SequencingEfforts,
        ViewKind::CompareSideBySide,
        ViewKind::CompareVariants,
        ViewKind::CompareToBaseline,
    ];

    /// Last path segment of the view.
    pub fn slug(&self) -> &'static str {
        match self {
            ViewKind::SingleVariant => "single-variant",
            ViewKind::SequencingEfforts => "sequencing-efforts",
            ViewKind::CompareSideBySide => "compare-side-by-side",
            ViewKind::CompareVariants => "compare-variants",
            ViewKind::CompareToBaseline => "compare-to-baseline",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::SingleVariant => "Analyze a single variant",
            ViewKind::SequencingEfforts => "Sequencing efforts",
            ViewKind::CompareSideBySide => "Compare side-by-side",
            ViewKind::CompareVariants => "Compare variants",
            ViewKind::CompareToBaseline => "Compare to baseline",
        }
    }

    /// Whether the view's query string carries `field$id` groups.
    pub fn is_multi_filter(&self) -> bool {
        matches!(
            self,
            ViewKind::CompareSideBySide | ViewKind::CompareVariants | ViewKind::CompareToBaseline
        )
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("unknown view: {}", s))
    }
}

/// A parsed dashboard page: organism, pathname and page-specific filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub organism: String,
    pub pathname: String,
    #[serde(flatten)]
    pub data: RouteData,
}

impl Route {
    pub fn kind(&self) -> ViewKind {
        self.data.kind()
    }
}

/// Page-specific route content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RouteData {
    SingleVariant {
        baseline_filter: BaselineFilter,
        variant_filter: VariantFilter,
    },
    SequencingEfforts {
        baseline_filter: BaselineFilter,
    },
    CompareSideBySide {
        filters: BTreeMap<u32, FilterGroup>,
    },
    CompareVariants {
        baseline_filter: BaselineFilter,
        variants: BTreeMap<u32, VariantFilter>,
    },
    CompareToBaseline {
        baseline_filter: BaselineFilter,
        baseline_variant: VariantFilter,
        variants: BTreeMap<u32, VariantFilter>,
    },
}

impl RouteData {
    pub fn kind(&self) -> ViewKind {
        match self {
            RouteData::SingleVariant { .. } => ViewKind::SingleVariant,
            RouteData::SequencingEfforts { .. } => ViewKind::SequencingEfforts,
            RouteData::CompareSideBySide { .. } => ViewKind::CompareSideBySide,
            RouteData::CompareVariants { .. } => ViewKind::CompareVariants,
            RouteData::CompareToBaseline { .. } => ViewKind::CompareToBaseline,
        }
    }
}
