//! Generic view: one page kind of one organism.
//!
//! # Responsibilities
//! - Parse a query string into a [`Route`]
//! - Serialize a [`Route`] back to its canonical URL
//! - Project a [`Route`] onto LAPIS filters
//!
//! # Design Decisions
//! - All organisms share this code; differences live in [`OrganismConfig`]
//! - Parsing is all-or-nothing: a rejected field rejects the route
//! - Default-valued fields are omitted on write and restored on parse

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use url::Url;

use crate::config::OrganismConfig;
use crate::filters::{BaselineFilter, FilterGroup, VariantFilter};
use crate::lapis::{GroupFilter, LapisFilter};
use crate::observability::metrics;
use crate::views::codec::{self, ParseError};
use crate::views::query::{QueryParams, QueryWriter};
use crate::views::route::{Route, RouteData, ViewKind};

/// Group ids of a fresh side-by-side comparison.
const DEFAULT_SIDE_BY_SIDE_GROUPS: [u32; 2] = [0, 1];

#[derive(Debug, Clone)]
pub struct View {
    organism: Arc<OrganismConfig>,
    kind: ViewKind,
    pathname: String,
    /// Fields that may carry a `$id` suffix; `None` for single-filter views.
    group_fields: Option<Vec<String>>,
}

impl View {
    pub fn new(organism: Arc<OrganismConfig>, kind: ViewKind) -> Self {
        let pathname = format!("/{}/{}", organism.path_segment, kind.slug());
        let group_fields = kind
            .is_multi_filter()
            .then(|| codec::group_fields(&organism, kind == ViewKind::CompareSideBySide));
        Self {
            organism,
            kind,
            pathname,
            group_fields,
        }
    }

    pub fn organism(&self) -> &OrganismConfig {
        &self.organism
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    fn default_baseline(&self) -> BaselineFilter {
        BaselineFilter::new(self.organism.default_date_range)
    }

    /// The route of a URL without recognized parameters.
    pub fn default_route(&self) -> Route {
        let data = match self.kind {
            ViewKind::SingleVariant => RouteData::SingleVariant {
                baseline_filter: self.default_baseline(),
                variant_filter: VariantFilter::default(),
            },
            ViewKind::SequencingEfforts => RouteData::SequencingEfforts {
                baseline_filter: self.default_baseline(),
            },
            ViewKind::CompareSideBySide => RouteData::CompareSideBySide {
                filters: DEFAULT_SIDE_BY_SIDE_GROUPS
                    .into_iter()
                    .map(|id| (id, FilterGroup::new(self.default_baseline(), VariantFilter::default())))
                    .collect(),
            },
            ViewKind::CompareVariants => RouteData::CompareVariants {
                baseline_filter: self.default_baseline(),
                variants: BTreeMap::new(),
            },
            ViewKind::CompareToBaseline => RouteData::CompareToBaseline {
                baseline_filter: self.default_baseline(),
                baseline_variant: VariantFilter::default(),
                variants: BTreeMap::new(),
            },
        };
        self.route(data)
    }

    fn route(&self, data: RouteData) -> Route {
        Route {
            organism: self.organism.key.clone(),
            pathname: self.pathname.clone(),
            data,
        }
    }

    /// Parse the query of a browser URL. `None` when the query is rejected.
    pub fn parse_url(&self, url: &Url) -> Option<Route> {
        self.parse_query(url.query().unwrap_or_default())
    }

    pub fn parse_query(&self, query: &str) -> Option<Route> {
        self.try_parse_query(query).ok()
    }

    /// Parse a query string, reporting why it was rejected.
    pub fn try_parse_query(&self, query: &str) -> Result<Route, ParseError> {
        let result = self.parse_data(query).map(|data| self.route(data));
        match &result {
            Ok(_) => metrics::record_route_parse(&self.organism.key, self.kind, "ok"),
            Err(e) => {
                tracing::debug!(
                    organism = %self.organism.key,
                    view = %self.kind,
                    error = %e,
                    "Rejected dashboard query"
                );
                metrics::record_route_parse(&self.organism.key, self.kind, "rejected");
            }
        }
        result
    }

    fn parse_data(&self, query: &str) -> Result<RouteData, ParseError> {
        let organism = self.organism.as_ref();
        let params = QueryParams::parse(query, self.group_fields.as_deref())?;
        let plain = params.plain();

        let data = match self.kind {
            ViewKind::SingleVariant => RouteData::SingleVariant {
                baseline_filter: codec::parse_baseline(plain, organism)?,
                variant_filter: codec::parse_variant(plain, organism, None)?,
            },
            ViewKind::SequencingEfforts => RouteData::SequencingEfforts {
                baseline_filter: codec::parse_baseline(plain, organism)?,
            },
            ViewKind::CompareSideBySide => {
                if !params.has_groups() {
                    return Ok(self.default_route().data);
                }
                let mut filters = BTreeMap::new();
                for id in params.group_ids() {
                    let fields = params.group(id);
                    let group = FilterGroup::new(
                        codec::parse_baseline(fields, organism)?,
                        codec::parse_variant(fields, organism, Some(id))?,
                    );
                    filters.insert(id, group);
                }
                RouteData::CompareSideBySide { filters }
            }
            ViewKind::CompareVariants => RouteData::CompareVariants {
                baseline_filter: codec::parse_baseline(plain, organism)?,
                variants: self.parse_variant_groups(&params)?,
            },
            ViewKind::CompareToBaseline => RouteData::CompareToBaseline {
                baseline_filter: codec::parse_baseline(plain, organism)?,
                baseline_variant: codec::parse_variant(plain, organism, None)?,
                variants: self.parse_variant_groups(&params)?,
            },
        };
        Ok(data)
    }

    fn parse_variant_groups(&self, params: &QueryParams) -> Result<BTreeMap<u32, VariantFilter>, ParseError> {
        params
            .group_ids()
            .map(|id| {
                codec::parse_variant(params.group(id), &self.organism, Some(id)).map(|variant| (id, variant))
            })
            .collect()
    }

    /// Canonical URL (pathname and query) of a route of this view.
    ///
    /// `None` for a route of another view, and for a side-by-side route
    /// without groups: no URL parses back to one.
    pub fn to_url(&self, route: &Route) -> Option<String> {
        if route.kind() != self.kind || route.organism != self.organism.key {
            return None;
        }
        if matches!(&route.data, RouteData::CompareSideBySide { filters } if filters.is_empty()) {
            return None;
        }

        let query = self.to_query(&route.data);
        if query.is_empty() {
            Some(self.pathname.clone())
        } else {
            Some(format!("{}?{}", self.pathname, query))
        }
    }

    /// Encoded query string of a route, without the leading `?`.
    pub fn to_query(&self, data: &RouteData) -> String {
        let organism = self.organism.as_ref();
        let mut writer = QueryWriter::new();

        match data {
            RouteData::SingleVariant {
                baseline_filter,
                variant_filter,
            } => {
                let mut out = writer.scope(None);
                codec::write_baseline(&mut out, baseline_filter, organism);
                codec::write_variant(&mut out, variant_filter, organism);
            }
            RouteData::SequencingEfforts { baseline_filter } => {
                codec::write_baseline(&mut writer.scope(None), baseline_filter, organism);
            }
            RouteData::CompareSideBySide { filters } => {
                for (id, group) in filters {
                    let mut out = writer.scope(Some(*id));
                    codec::write_baseline(&mut out, &group.baseline_filter, organism);
                    codec::write_variant(&mut out, &group.variant_filter, organism);
                    out.anchor(self.anchor_field());
                }
            }
            RouteData::CompareVariants {
                baseline_filter,
                variants,
            } => {
                codec::write_baseline(&mut writer.scope(None), baseline_filter, organism);
                self.write_variant_groups(&mut writer, variants);
            }
            RouteData::CompareToBaseline {
                baseline_filter,
                baseline_variant,
                variants,
            } => {
                let mut out = writer.scope(None);
                codec::write_baseline(&mut out, baseline_filter, organism);
                codec::write_variant(&mut out, baseline_variant, organism);
                self.write_variant_groups(&mut writer, variants);
            }
        }

        writer.finish()
    }

    fn write_variant_groups(&self, writer: &mut QueryWriter, variants: &BTreeMap<u32, VariantFilter>) {
        for (id, variant) in variants {
            let mut out = writer.scope(Some(*id));
            codec::write_variant(&mut out, variant, &self.organism);
            out.anchor(self.anchor_field());
        }
    }

    /// Field that declares an otherwise empty filter group.
    fn anchor_field(&self) -> &str {
        let fields = match self.kind {
            ViewKind::CompareSideBySide => &self.organism.location_fields,
            _ => &self.organism.lineage_fields,
        };
        fields.first().map(String::as_str).unwrap_or(codec::NUCLEOTIDE_MUTATIONS)
    }

    /// The page's main LAPIS filter.
    ///
    /// Baseline plus variant for single-filter pages, the baseline for
    /// comparisons, and the lowest group for side-by-side pages.
    pub fn to_lapis_filter(&self, route: &Route, today: NaiveDate) -> LapisFilter {
        let organism = self.organism.as_ref();
        match &route.data {
            RouteData::SingleVariant {
                baseline_filter,
                variant_filter,
            } => LapisFilter::from_filters(organism, baseline_filter, Some(variant_filter), today),
            RouteData::SequencingEfforts { baseline_filter }
            | RouteData::CompareVariants { baseline_filter, .. } => {
                LapisFilter::from_filters(organism, baseline_filter, None, today)
            }
            RouteData::CompareToBaseline {
                baseline_filter,
                baseline_variant,
                ..
            } => LapisFilter::from_filters(organism, baseline_filter, Some(baseline_variant), today),
            RouteData::CompareSideBySide { filters } => match filters.values().next() {
                Some(group) => LapisFilter::from_filters(
                    organism,
                    &group.baseline_filter,
                    Some(&group.variant_filter),
                    today,
                ),
                None => LapisFilter::from_filters(organism, &self.default_baseline(), None, today),
            },
        }
    }

    /// Every LAPIS filter the page needs: the baseline (if any) first, then
    /// one per filter group in id order.
    pub fn to_lapis_filters(&self, route: &Route, today: NaiveDate) -> Vec<GroupFilter> {
        let organism = self.organism.as_ref();
        let baseline_entry = |filter| GroupFilter { group: None, filter };

        match &route.data {
            RouteData::SingleVariant { .. } | RouteData::SequencingEfforts { .. } => {
                vec![baseline_entry(self.to_lapis_filter(route, today))]
            }
            RouteData::CompareSideBySide { filters } => filters
                .iter()
                .map(|(id, group)| GroupFilter {
                    group: Some(*id),
                    filter: LapisFilter::from_filters(
                        organism,
                        &group.baseline_filter,
                        Some(&group.variant_filter),
                        today,
                    ),
                })
                .collect(),
            RouteData::CompareVariants {
                baseline_filter,
                variants,
            }
            | RouteData::CompareToBaseline {
                baseline_filter,
                variants,
                ..
            } => {
                let mut entries = vec![baseline_entry(self.to_lapis_filter(route, today))];
                entries.extend(variants.iter().map(|(id, variant)| GroupFilter {
                    group: Some(*id),
                    filter: LapisFilter::from_filters(organism, baseline_filter, Some(variant), today),
                }));
                entries
            }
        }
    }
}
