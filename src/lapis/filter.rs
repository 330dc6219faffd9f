//! LAPIS filter objects.
//!
//! LAPIS takes a flat JSON object: `<dateField>From`/`<dateField>To`, one key
//! per metadata field, and list keys for mutations and insertions. Absent
//! fields and empty lists are left out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::OrganismConfig;
use crate::filters::{BaselineFilter, VariantFilter};
use crate::views::codec::{
    AMINO_ACID_INSERTIONS, AMINO_ACID_MUTATIONS, NUCLEOTIDE_INSERTIONS, NUCLEOTIDE_MUTATIONS,
    VARIANT_QUERY,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapisFilter(Map<String, Value>);

impl LapisFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project a baseline filter and an optional variant onto LAPIS keys.
    ///
    /// Named date ranges resolve against `today`, `allTimes` against the
    /// organism's earliest date.
    pub fn from_filters(
        organism: &OrganismConfig,
        baseline: &BaselineFilter,
        variant: Option<&VariantFilter>,
        today: NaiveDate,
    ) -> Self {
        let mut filter = LapisFilter::new();

        let (from, to) = baseline.date_range.resolve(today, organism.earliest_date);
        filter.insert_str(format!("{}From", organism.date_field), from.to_string());
        filter.insert_str(format!("{}To", organism.date_field), to.to_string());

        for (field, value) in baseline.location.iter() {
            filter.insert_str(field, value);
        }

        match variant {
            Some(VariantFilter::Structured(query)) => {
                for (field, value) in &query.lineages {
                    filter.insert_str(field, value);
                }
                filter.insert_list(NUCLEOTIDE_MUTATIONS, &query.nucleotide_mutations);
                filter.insert_list(AMINO_ACID_MUTATIONS, &query.amino_acid_mutations);
                filter.insert_list(NUCLEOTIDE_INSERTIONS, &query.nucleotide_insertions);
                filter.insert_list(AMINO_ACID_INSERTIONS, &query.amino_acid_insertions);
            }
            Some(VariantFilter::Advanced { variant_query }) => {
                filter.insert_str(VARIANT_QUERY, variant_query);
            }
            None => {}
        }

        filter
    }

    /// Set a string key; empty values are skipped.
    pub fn insert_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key.into(), Value::String(value));
        }
    }

    /// Set a list key; empty lists are skipped.
    pub fn insert_list(&mut self, key: impl Into<String>, values: &[String]) {
        if !values.is_empty() {
            let values = values.iter().cloned().map(Value::String).collect();
            self.0.insert(key.into(), Value::Array(values));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// A filter tagged with the filter group it belongs to.
///
/// `group` is `None` for the page's baseline or single filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFilter {
    pub group: Option<u32>,
    pub filter: LapisFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::builtin_organisms;
    use crate::filters::{DateRange, LineageQuery, NamedDateRange};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_times_uses_earliest_date() {
        let covid = builtin_organisms().remove(0);
        let baseline = BaselineFilter::new(DateRange::Named(NamedDateRange::AllTimes));
        let filter = LapisFilter::from_filters(&covid, &baseline, None, date(2024, 5, 17));

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "dateFrom": "2020-01-06", "dateTo": "2024-05-17" })
        );
    }

    #[test]
    fn test_structured_projection() {
        let covid = builtin_organisms().remove(0);
        let baseline = BaselineFilter::new(DateRange::custom(date(2023, 1, 1), date(2023, 12, 31)).unwrap())
            .with_location("region", "Europe")
            .with_location("country", "Switzerland");
        let variant: VariantFilter = LineageQuery::new()
            .with_lineage("nextcladePangoLineage", "JN.1*")
            .with_nucleotide_mutation("C27889T")
            .with_amino_acid_mutation("S:L455S")
            .into();

        let filter = LapisFilter::from_filters(&covid, &baseline, Some(&variant), date(2024, 5, 17));

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "dateFrom": "2023-01-01",
                "dateTo": "2023-12-31",
                "region": "Europe",
                "country": "Switzerland",
                "nextcladePangoLineage": "JN.1*",
                "nucleotideMutations": ["C27889T"],
                "aminoAcidMutations": ["S:L455S"],
            })
        );
    }

    #[test]
    fn test_advanced_projection_uses_organism_date_field() {
        let rsv = builtin_organisms()
            .into_iter()
            .find(|o| o.key == "rsv-a")
            .unwrap();
        let baseline = BaselineFilter::new(DateRange::Named(NamedDateRange::Last7Days));
        let variant = VariantFilter::advanced("A123T | G456C");

        let filter = LapisFilter::from_filters(&rsv, &baseline, Some(&variant), date(2024, 5, 17));

        assert_eq!(
            filter.get("sampleCollectionDateFrom"),
            Some(&json!("2024-05-10"))
        );
        assert_eq!(filter.get("sampleCollectionDateTo"), Some(&json!("2024-05-17")));
        assert_eq!(filter.get("variantQuery"), Some(&json!("A123T | G456C")));
        assert_eq!(filter.len(), 3);
    }
}
