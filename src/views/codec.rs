//! Field-level codecs shared by all views.
//!
//! Location and lineage field names come from the organism config; the
//! remaining names are fixed across organisms.

use thiserror::Error;

use crate::config::OrganismConfig;
use crate::filters::{BaselineFilter, DateRange, DateRangeError, LineageQuery, LocationFilter, VariantFilter};
use crate::views::query::{Fields, QueryError, ScopedWriter};

pub const DATE: &str = "date";
pub const NUCLEOTIDE_MUTATIONS: &str = "nucleotideMutations";
pub const AMINO_ACID_MUTATIONS: &str = "aminoAcidMutations";
pub const NUCLEOTIDE_INSERTIONS: &str = "nucleotideInsertions";
pub const AMINO_ACID_INSERTIONS: &str = "aminoAcidInsertions";
pub const VARIANT_QUERY: &str = "variantQuery";

/// Query fields whose names do not depend on the organism.
pub const RESERVED_FIELDS: [&str; 6] = [
    DATE,
    NUCLEOTIDE_MUTATIONS,
    AMINO_ACID_MUTATIONS,
    NUCLEOTIDE_INSERTIONS,
    AMINO_ACID_INSERTIONS,
    VARIANT_QUERY,
];

/// Reasons a query string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("invalid date range: {0}")]
    DateRange(#[from] DateRangeError),

    #[error("advanced variant query combined with structured fields{}", group_suffix(.group))]
    ConflictingVariantQuery { group: Option<u32> },
}

/// Query fields a filter group can carry: the variant fields, plus the
/// baseline fields when `with_baseline`.
pub fn group_fields(organism: &OrganismConfig, with_baseline: bool) -> Vec<String> {
    let mut fields = Vec::new();
    if with_baseline {
        fields.extend(organism.location_fields.iter().cloned());
        fields.push(DATE.to_string());
    }
    fields.extend(organism.lineage_fields.iter().cloned());
    fields.extend(
        [
            NUCLEOTIDE_MUTATIONS,
            AMINO_ACID_MUTATIONS,
            NUCLEOTIDE_INSERTIONS,
            AMINO_ACID_INSERTIONS,
        ]
        .map(String::from),
    );
    if organism.advanced_queries {
        fields.push(VARIANT_QUERY.to_string());
    }
    fields
}

fn group_suffix(group: &Option<u32>) -> String {
    group.map(|id| format!(" in group {}", id)).unwrap_or_default()
}

pub fn parse_baseline(fields: Fields<'_>, organism: &OrganismConfig) -> Result<BaselineFilter, ParseError> {
    let location: LocationFilter = organism
        .location_fields
        .iter()
        .filter_map(|field| fields.get(field).map(|value| (field.as_str(), value)))
        .collect();

    let date_range = match fields.get(DATE) {
        Some(value) => value.parse::<DateRange>()?,
        None => organism.default_date_range,
    };

    Ok(BaselineFilter { location, date_range })
}

pub fn write_baseline(out: &mut ScopedWriter<'_>, filter: &BaselineFilter, organism: &OrganismConfig) {
    for field in &organism.location_fields {
        if let Some(value) = filter.location.get(field) {
            out.set(field, value);
        }
    }
    if filter.date_range != organism.default_date_range {
        out.set(DATE, &filter.date_range.to_string());
    }
}

/// Read a variant filter. `group` only labels the error.
pub fn parse_variant(
    fields: Fields<'_>,
    organism: &OrganismConfig,
    group: Option<u32>,
) -> Result<VariantFilter, ParseError> {
    let query = LineageQuery {
        lineages: organism
            .lineage_fields
            .iter()
            .filter_map(|field| fields.get(field).map(|value| (field.clone(), value.to_string())))
            .collect(),
        nucleotide_mutations: fields.list(NUCLEOTIDE_MUTATIONS),
        amino_acid_mutations: fields.list(AMINO_ACID_MUTATIONS),
        nucleotide_insertions: fields.list(NUCLEOTIDE_INSERTIONS),
        amino_acid_insertions: fields.list(AMINO_ACID_INSERTIONS),
    };

    let advanced = organism
        .advanced_queries
        .then(|| fields.get(VARIANT_QUERY))
        .flatten();

    match advanced {
        Some(_) if !query.is_empty() => Err(ParseError::ConflictingVariantQuery { group }),
        Some(variant_query) => Ok(VariantFilter::advanced(variant_query)),
        None => Ok(VariantFilter::Structured(query)),
    }
}

pub fn write_variant(out: &mut ScopedWriter<'_>, filter: &VariantFilter, organism: &OrganismConfig) {
    match filter {
        VariantFilter::Structured(query) => {
            for field in &organism.lineage_fields {
                if let Some(value) = query.lineages.get(field) {
                    out.set(field, value);
                }
            }
            out.set_list(NUCLEOTIDE_MUTATIONS, &query.nucleotide_mutations);
            out.set_list(AMINO_ACID_MUTATIONS, &query.amino_acid_mutations);
            out.set_list(NUCLEOTIDE_INSERTIONS, &query.nucleotide_insertions);
            out.set_list(AMINO_ACID_INSERTIONS, &query.amino_acid_insertions);
        }
        VariantFilter::Advanced { variant_query } => {
            if organism.advanced_queries {
                out.set(VARIANT_QUERY, variant_query);
            } else {
                tracing::warn!(
                    organism = %organism.key,
                    "Dropping advanced variant query; organism does not support it"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::builtin_organisms;
    use crate::filters::NamedDateRange;
    use crate::views::query::{QueryParams, QueryWriter};

    fn covid() -> OrganismConfig {
        builtin_organisms().remove(0)
    }

    fn mpox() -> OrganismConfig {
        builtin_organisms()
            .into_iter()
            .find(|o| o.key == "mpox")
            .unwrap()
    }

    fn plain(query: &str) -> QueryParams {
        QueryParams::parse(query, None).unwrap()
    }

    #[test]
    fn test_baseline_defaults() {
        let params = plain("");
        let baseline = parse_baseline(params.plain(), &covid()).unwrap();
        assert!(baseline.location.is_empty());
        assert_eq!(baseline.date_range, DateRange::Named(NamedDateRange::Last6Months));
    }

    #[test]
    fn test_baseline_ignores_unknown_location_fields() {
        let params = plain("region=Europe&geoLocCountry=France");
        let baseline = parse_baseline(params.plain(), &covid()).unwrap();
        assert_eq!(baseline.location.get("region"), Some("Europe"));
        assert_eq!(baseline.location.get("geoLocCountry"), None);
    }

    #[test]
    fn test_baseline_rejects_bad_date() {
        let params = plain("date=yesterday");
        assert!(matches!(
            parse_baseline(params.plain(), &covid()),
            Err(ParseError::DateRange(_))
        ));
    }

    #[test]
    fn test_default_date_is_omitted() {
        let organism = covid();
        let mut writer = QueryWriter::new();
        let filter = BaselineFilter::new(organism.default_date_range).with_location("country", "Germany");
        write_baseline(&mut writer.scope(None), &filter, &organism);
        assert_eq!(writer.finish(), "country=Germany");
    }

    #[test]
    fn test_structured_variant() {
        let params = plain("clade=IIb&lineage=B.1&nucleotideMutations=C123T&aminoAcidInsertions=ins_OPG153:271:K");
        let variant = parse_variant(params.plain(), &mpox(), None).unwrap();
        assert_eq!(
            variant,
            VariantFilter::Structured(
                LineageQuery::new()
                    .with_lineage("clade", "IIb")
                    .with_lineage("lineage", "B.1")
                    .with_nucleotide_mutation("C123T")
                    .with_amino_acid_insertion("ins_OPG153:271:K")
            )
        );
    }

    #[test]
    fn test_advanced_variant() {
        let params = plain("variantQuery=C27889T%20%26%20!S%3AL455S");
        let variant = parse_variant(params.plain(), &covid(), None).unwrap();
        assert_eq!(variant, VariantFilter::advanced("C27889T & !S:L455S"));
    }

    #[test]
    fn test_advanced_and_structured_conflict() {
        let params = plain("variantQuery=X&nucleotideMutations=A123T");
        assert_eq!(
            parse_variant(params.plain(), &covid(), Some(3)),
            Err(ParseError::ConflictingVariantQuery { group: Some(3) })
        );
    }

    #[test]
    fn test_variant_query_ignored_without_support() {
        let params = plain("variantQuery=X&nucleotideMutations=A123T");
        let variant = parse_variant(params.plain(), &mpox(), None).unwrap();
        assert_eq!(
            variant,
            VariantFilter::Structured(LineageQuery::new().with_nucleotide_mutation("A123T"))
        );
    }

    #[test]
    fn test_conflict_error_message() {
        let err = ParseError::ConflictingVariantQuery { group: Some(2) };
        assert_eq!(
            err.to_string(),
            "advanced variant query combined with structured fields in group 2"
        );
        let err = ParseError::ConflictingVariantQuery { group: None };
        assert_eq!(err.to_string(), "advanced variant query combined with structured fields");
    }
}
