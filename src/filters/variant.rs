//! Variant selection.
//!
//! A variant is either a structured lineage/mutation query or, for organisms
//! that support it, a free-text advanced query. The two are exclusive; the
//! enum discriminant decides which one applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured variant query: lineages plus mutation and insertion lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageQuery {
    /// Lineage or clade value per configured lineage field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lineages: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nucleotide_mutations: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amino_acid_mutations: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nucleotide_insertions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amino_acid_insertions: Vec<String>,
}

impl LineageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
            && self.nucleotide_mutations.is_empty()
            && self.amino_acid_mutations.is_empty()
            && self.nucleotide_insertions.is_empty()
            && self.amino_acid_insertions.is_empty()
    }

    /// Sets the lineage for `field`; an empty value clears it.
    pub fn with_lineage(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.lineages.remove(&field);
        } else {
            self.lineages.insert(field, value);
        }
        self
    }

    pub fn with_nucleotide_mutation(mut self, mutation: impl Into<String>) -> Self {
        push_non_blank(&mut self.nucleotide_mutations, mutation.into());
        self
    }

    pub fn with_amino_acid_mutation(mut self, mutation: impl Into<String>) -> Self {
        push_non_blank(&mut self.amino_acid_mutations, mutation.into());
        self
    }

    pub fn with_nucleotide_insertion(mut self, insertion: impl Into<String>) -> Self {
        push_non_blank(&mut self.nucleotide_insertions, insertion.into());
        self
    }

    pub fn with_amino_acid_insertion(mut self, insertion: impl Into<String>) -> Self {
        push_non_blank(&mut self.amino_acid_insertions, insertion.into());
        self
    }
}

// List entries are comma-joined in URLs, so blanks would not survive.
fn push_non_blank(list: &mut Vec<String>, entry: String) {
    let entry = entry.trim();
    if !entry.is_empty() {
        list.push(entry.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VariantFilter {
    Structured(LineageQuery),
    Advanced {
        #[serde(rename = "variantQuery")]
        variant_query: String,
    },
}

impl VariantFilter {
    /// Free-text query. A blank query selects nothing and gives the default.
    pub fn advanced(query: impl Into<String>) -> Self {
        let query = query.into();
        if query.trim().is_empty() {
            return VariantFilter::default();
        }
        VariantFilter::Advanced {
            variant_query: query,
        }
    }

    /// True for the default variant: nothing selected.
    pub fn is_empty(&self) -> bool {
        match self {
            VariantFilter::Structured(query) => query.is_empty(),
            VariantFilter::Advanced { variant_query } => variant_query.is_empty(),
        }
    }
}

impl Default for VariantFilter {
    fn default() -> Self {
        VariantFilter::Structured(LineageQuery::default())
    }
}

impl From<LineageQuery> for VariantFilter {
    fn from(query: LineageQuery) -> Self {
        VariantFilter::Structured(query)
    }
}
