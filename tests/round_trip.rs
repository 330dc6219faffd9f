//! URL round trips across every built-in organism and view.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use dashboard_routes::config::schema::builtin_organisms;
use dashboard_routes::config::OrganismConfig;
use dashboard_routes::filters::{
    BaselineFilter, DateRange, FilterGroup, LineageQuery, NamedDateRange, VariantFilter,
};
use dashboard_routes::{Registry, Route, RouteData, View, ViewKind};

fn registry() -> Registry {
    Registry::from_config(&builtin_organisms())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn baseline(organism: &OrganismConfig) -> BaselineFilter {
    let range = DateRange::custom(date(2021, 1, 1), date(2021, 6, 30)).unwrap();
    BaselineFilter::new(range).with_location(&organism.location_fields[0], "North America")
}

fn variant(organism: &OrganismConfig, lineage: &str) -> VariantFilter {
    LineageQuery::new()
        .with_lineage(&organism.lineage_fields[0], lineage)
        .with_nucleotide_mutation("A123T")
        .with_nucleotide_mutation("C456G")
        .with_amino_acid_mutation("S:N501Y")
        .with_nucleotide_insertion("ins_22204:GAG")
        .with_amino_acid_insertion("ins_S:214:EPE")
        .into()
}

fn populated(view: &View) -> RouteData {
    let organism = view.organism();
    match view.kind() {
        ViewKind::SingleVariant => RouteData::SingleVariant {
            baseline_filter: baseline(organism),
            variant_filter: variant(organism, "B.1*"),
        },
        ViewKind::SequencingEfforts => RouteData::SequencingEfforts {
            baseline_filter: BaselineFilter::new(NamedDateRange::Last3Months.into())
                .with_location(&organism.location_fields[0], "Europe"),
        },
        ViewKind::CompareSideBySide => RouteData::CompareSideBySide {
            filters: BTreeMap::from([
                (1, FilterGroup::new(baseline(organism), variant(organism, "A.1"))),
                (
                    4,
                    FilterGroup::new(
                        BaselineFilter::new(organism.default_date_range),
                        VariantFilter::default(),
                    ),
                ),
            ]),
        },
        ViewKind::CompareVariants => RouteData::CompareVariants {
            baseline_filter: baseline(organism),
            variants: BTreeMap::from([(2, variant(organism, "A")), (7, VariantFilter::default())]),
        },
        ViewKind::CompareToBaseline => RouteData::CompareToBaseline {
            baseline_filter: baseline(organism),
            baseline_variant: variant(organism, "B"),
            variants: BTreeMap::from([(0, VariantFilter::default()), (5, variant(organism, "C"))]),
        },
    }
}

fn route_of(view: &View, data: RouteData) -> Route {
    Route {
        organism: view.organism().key.clone(),
        pathname: view.pathname().to_string(),
        data,
    }
}

#[test]
fn test_every_view_is_registered() {
    let registry = registry();
    assert_eq!(registry.views().count(), 6 * ViewKind::ALL.len());
    for organism in builtin_organisms() {
        for kind in ViewKind::ALL {
            let view = registry.find_view(&organism.key, kind).unwrap();
            assert_eq!(
                view.pathname(),
                format!("/{}/{}", organism.path_segment, kind.slug())
            );
        }
    }
}

#[test]
fn test_default_routes_round_trip() {
    let registry = registry();
    for view in registry.views() {
        let route = view.default_route();
        let url = view.to_url(&route).unwrap();
        assert_eq!(registry.parse_str(&url), Some(route.clone()), "{}", url);

        // A bare pathname or unknown parameters give the same route.
        assert_eq!(registry.parse_str(view.pathname()), Some(route.clone()));
        let unknown = format!("{}?utm_source=newsletter", view.pathname());
        assert_eq!(registry.parse_str(&unknown), Some(route.clone()));
        let unknown_grouped = format!("{}?utm_source$1=x&ref$5=mail", view.pathname());
        assert_eq!(registry.parse_str(&unknown_grouped), Some(route), "{}", unknown_grouped);
    }
}

#[test]
fn test_populated_routes_round_trip() {
    let registry = registry();
    for view in registry.views() {
        let route = route_of(view, populated(view));
        let url = registry.to_url(&route).unwrap();
        assert_eq!(registry.parse_str(&url), Some(route), "{}", url);

        let absolute = format!("https://genspectrum.org{}", url);
        assert!(registry.parse_str(&absolute).is_some(), "{}", absolute);
    }
}

#[test]
fn test_advanced_queries_round_trip() {
    let registry = registry();
    for kind in ViewKind::ALL {
        let view = registry.find_view("covid", kind).unwrap();
        let data = match populated(view) {
            RouteData::SingleVariant { baseline_filter, .. } => RouteData::SingleVariant {
                baseline_filter,
                variant_filter: VariantFilter::advanced("BA.2* & !C23202T"),
            },
            RouteData::CompareToBaseline {
                baseline_filter,
                mut variants,
                ..
            } => {
                variants.insert(9, VariantFilter::advanced("nextcladePangoLineage:XBB*"));
                RouteData::CompareToBaseline {
                    baseline_filter,
                    baseline_variant: VariantFilter::advanced("[2-of: S:N501Y, S:E484K, C241T]"),
                    variants,
                }
            }
            other => other,
        };
        let route = route_of(view, data);
        let url = view.to_url(&route).unwrap();
        assert_eq!(registry.parse_str(&url), Some(route), "{}", url);
    }
}

#[test]
fn test_group_order_does_not_matter() {
    let registry = registry();
    let forward = registry
        .parse_str("/rsv-b/compare-variants?lineage$1=B.D&lineage$2=B.D.E.1&nucleotideMutations$2=T123A")
        .unwrap();
    let reversed = registry
        .parse_str("/rsv-b/compare-variants?nucleotideMutations$2=T123A&lineage$2=B.D.E.1&lineage$1=B.D")
        .unwrap();
    assert_eq!(forward, reversed);

    let RouteData::CompareVariants { variants, .. } = &forward.data else {
        panic!("wrong view: {:?}", forward.kind());
    };
    assert_eq!(variants.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_covid_baseline_example() {
    let route = registry()
        .parse_str("/covid/single-variant?region=Europe&date=last6Months")
        .unwrap();

    assert_eq!(
        route.data,
        RouteData::SingleVariant {
            baseline_filter: BaselineFilter::new(NamedDateRange::Last6Months.into())
                .with_location("region", "Europe"),
            variant_filter: VariantFilter::default(),
        }
    );
}

#[test]
fn test_advanced_and_structured_are_rejected() {
    let registry = registry();
    assert_eq!(
        registry.parse_str("/covid/single-variant?variantQuery=X&nucleotideMutations=A123T"),
        None
    );
    assert_eq!(
        registry.parse_str("/covid/compare-variants?variantQuery$3=X&nextcladePangoLineage$3=BA.2"),
        None
    );

    // Organisms without advanced queries treat the key as unknown.
    let h5n1 = registry
        .parse_str("/h5n1/single-variant?variantQuery=X&nucleotideMutations=A123T")
        .unwrap();
    let RouteData::SingleVariant { variant_filter, .. } = h5n1.data else {
        panic!("wrong view");
    };
    assert_eq!(
        variant_filter,
        VariantFilter::from(LineageQuery::new().with_nucleotide_mutation("A123T"))
    );
}

#[test]
fn test_unknown_paths_and_bad_groups() {
    let registry = registry();
    assert_eq!(registry.parse_str("/covid"), None);
    assert_eq!(registry.parse_str("/covid/single-variant/extra"), None);
    assert_eq!(registry.parse_str("/COVID/single-variant"), None);
    assert!(registry.parse_str("/covid/single-variant/").is_some());
    assert_eq!(
        registry.parse_str("/mpox/compare-side-by-side?geoLocCountry$first=Nigeria"),
        None
    );
}
