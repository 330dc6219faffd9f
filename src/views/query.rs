//! Query string access for view codecs.
//!
//! # Responsibilities
//! - Decode `application/x-www-form-urlencoded` pairs
//! - Split `field$id` keys into filter groups for multi-filter views
//! - Encode fields back in a stable order
//!
//! # Design Decisions
//! - The first occurrence of a repeated key wins
//! - Empty values read as absent, but still declare their group
//! - Single-filter views never split keys; `$` is then just a character
//! - Only keys of known group fields are split; any other `x$1` is an
//!   unknown plain key and declares nothing

use std::collections::BTreeMap;

use thiserror::Error;
use url::form_urlencoded;

/// Separator between a field name and its filter group id.
pub const GROUP_SEPARATOR: char = '$';

static NO_FIELDS: BTreeMap<String, String> = BTreeMap::new();

/// Structural errors in a multi-filter query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("malformed group key: {0}")]
    MalformedGroupKey(String),

    #[error("invalid group id in key: {0}")]
    InvalidGroupId(String),
}

/// Decoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    plain: BTreeMap<String, String>,
    groups: BTreeMap<u32, BTreeMap<String, String>>,
}

impl QueryParams {
    /// Decode a query string (with or without the leading `?`).
    ///
    /// `group_fields` lists the fields that may appear as `field$id`; `None`
    /// disables grouping. A key whose field is listed must carry a numeric id.
    pub fn parse(query: &str, group_fields: Option<&[String]>) -> Result<Self, QueryError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = QueryParams::default();
        let is_group_field =
            |field: &str| group_fields.is_some_and(|fields| fields.iter().any(|f| f == field));

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let (fields, field) = match key.split_once(GROUP_SEPARATOR) {
                Some((field, id)) if is_group_field(field) => {
                    if id.is_empty() {
                        return Err(QueryError::MalformedGroupKey(key.to_string()));
                    }
                    let id: u32 = id
                        .parse()
                        .map_err(|_| QueryError::InvalidGroupId(key.to_string()))?;
                    (params.groups.entry(id).or_default(), field.to_string())
                }
                _ => (&mut params.plain, key.to_string()),
            };
            fields.entry(field).or_insert_with(|| value.into_owned());
        }

        Ok(params)
    }

    /// Ungrouped fields.
    pub fn plain(&self) -> Fields<'_> {
        Fields { map: &self.plain }
    }

    /// Group ids in ascending order.
    pub fn group_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Fields of one group; empty when the group is not declared.
    pub fn group(&self, id: u32) -> Fields<'_> {
        Fields {
            map: self.groups.get(&id).unwrap_or(&NO_FIELDS),
        }
    }
}

/// Read access to one set of fields.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a BTreeMap<String, String>,
}

impl<'a> Fields<'a> {
    /// Non-empty value of a field.
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.map
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Comma-separated list; blank items are dropped.
    pub fn list(&self, field: &str) -> Vec<String> {
        self.get(field)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builds a query string from fields in insertion order.
#[derive(Debug, Default)]
pub struct QueryWriter {
    pairs: Vec<(String, String)>,
}

impl QueryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer for plain fields (`None`) or one filter group.
    pub fn scope(&mut self, group: Option<u32>) -> ScopedWriter<'_> {
        ScopedWriter {
            writer: self,
            group,
            emitted: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded query string without the leading `?`.
    pub fn finish(self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Writes fields of one scope, suffixing keys with the group id if any.
#[derive(Debug)]
pub struct ScopedWriter<'a> {
    writer: &'a mut QueryWriter,
    group: Option<u32>,
    emitted: usize,
}

impl ScopedWriter<'_> {
    /// Write a field; empty values are skipped.
    pub fn set(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.push(field, value.to_string());
    }

    /// Write a comma-separated list; empty lists are skipped.
    pub fn set_list(&mut self, field: &str, values: &[String]) {
        let joined = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.set(field, &joined);
    }

    /// Declare the group with an empty `field` if nothing was written for it.
    pub fn anchor(&mut self, field: &str) {
        if self.group.is_some() && self.emitted == 0 {
            self.push(field, String::new());
        }
    }

    fn push(&mut self, field: &str, value: String) {
        let key = match self.group {
            Some(id) => format!("{}{}{}", field, GROUP_SEPARATOR, id),
            None => field.to_string(),
        };
        self.writer.pairs.push((key, value));
        self.emitted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_fields() -> Vec<String> {
        vec!["region".into(), "country".into()]
    }

    #[test]
    fn test_plain_fields() {
        let params = QueryParams::parse("?region=Europe&country=&region=Asia", None).unwrap();
        assert_eq!(params.plain().get("region"), Some("Europe"));
        assert_eq!(params.plain().get("country"), None);
        assert!(!params.has_groups());
    }

    #[test]
    fn test_dollar_is_plain_in_single_views() {
        let params = QueryParams::parse("region$1=Europe", None).unwrap();
        assert_eq!(params.plain().get("region$1"), Some("Europe"));
    }

    #[test]
    fn test_groups() {
        let params =
            QueryParams::parse("date=allTimes&region%241=Europe&region$0=Asia&country$1=", Some(group_fields().as_slice()))
                .unwrap();
        assert_eq!(params.group_ids().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(params.plain().get("date"), Some("allTimes"));
        assert_eq!(params.group(1).get("region"), Some("Europe"));
        assert_eq!(params.group(0).get("region"), Some("Asia"));
        assert_eq!(params.group(7).get("region"), None);
    }

    #[test]
    fn test_malformed_group_keys() {
        let fields = group_fields();
        assert_eq!(
            QueryParams::parse("region$=Europe", Some(fields.as_slice())),
            Err(QueryError::MalformedGroupKey("region$".into()))
        );
        assert_eq!(
            QueryParams::parse("region$one=Europe", Some(fields.as_slice())),
            Err(QueryError::InvalidGroupId("region$one".into()))
        );
        assert_eq!(
            QueryParams::parse("region$-1=Europe", Some(fields.as_slice())),
            Err(QueryError::InvalidGroupId("region$-1".into()))
        );
    }

    #[test]
    fn test_unknown_group_keys_are_plain() {
        let params =
            QueryParams::parse("utm_source$1=newsletter&$2=x&tag$x=y", Some(group_fields().as_slice())).unwrap();
        assert!(!params.has_groups());
        assert_eq!(params.plain().get("utm_source$1"), Some("newsletter"));
    }

    #[test]
    fn test_list_parsing() {
        let params = QueryParams::parse("nucleotideMutations=C123T,%20A23403G,,", None).unwrap();
        assert_eq!(
            params.plain().list("nucleotideMutations"),
            vec!["C123T".to_string(), "A23403G".to_string()]
        );
        assert!(params.plain().list("aminoAcidMutations").is_empty());
    }

    #[test]
    fn test_writer() {
        let mut writer = QueryWriter::new();
        writer.scope(None).set("region", "Europe");

        let mut group = writer.scope(Some(2));
        group.set_list("nucleotideMutations", &["C123T".into(), "G4T".into()]);
        group.anchor("region");

        let mut empty = writer.scope(Some(3));
        empty.set("region", "");
        empty.anchor("region");

        assert_eq!(
            writer.finish(),
            "region=Europe&nucleotideMutations%242=C123T%2CG4T&region%243="
        );
    }
}
