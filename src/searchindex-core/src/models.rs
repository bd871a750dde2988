use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// IndexId identifies a search index. Anything displayable can be used, it is
/// always carried in string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexId(String);

impl IndexId {
    pub fn new(id: impl fmt::Display) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IndexId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IndexId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IndexId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for IndexId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<Uuid> for IndexId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&IndexId> for IndexId {
    fn from(id: &IndexId) -> Self {
        id.clone()
    }
}

/// GMetaEntry is a single document about a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GMetaEntry {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // Sub-identifier, null for the default entry
    pub visible_to: Vec<String>,
    pub content: serde_json::Value,
}

impl GMetaEntry {
    /// Create a publicly visible entry with a null entry id
    pub fn new(subject: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            subject: subject.into(),
            id: None,
            visible_to: vec!["public".to_string()],
            content,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_visible_to<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_to = principals.into_iter().map(Into::into).collect();
        self
    }
}

/// GMetaList batches several entries into one ingest call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GMetaList {
    pub gmeta: Vec<GMetaEntry>,
}

impl FromIterator<GMetaEntry> for GMetaList {
    fn from_iter<T: IntoIterator<Item = GMetaEntry>>(iter: T) -> Self {
        Self {
            gmeta: iter.into_iter().collect(),
        }
    }
}

/// IngestDocument is the envelope accepted by the ingest endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ingest_type", content = "ingest_data")]
pub enum IngestDocument {
    GMetaEntry(GMetaEntry),
    GMetaList(GMetaList),
}

impl From<GMetaEntry> for IngestDocument {
    fn from(entry: GMetaEntry) -> Self {
        Self::GMetaEntry(entry)
    }
}

impl From<GMetaList> for IngestDocument {
    fn from(list: GMetaList) -> Self {
        Self::GMetaList(list)
    }
}

/// Filter restricts a query to documents matching field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    MatchAll {
        field_name: String,
        values: Vec<String>,
    },
    MatchAny {
        field_name: String,
        values: Vec<String>,
    },
    Range {
        field_name: String,
        values: Vec<RangeBound>,
    },
}

/// RangeBound uses "*" for an open end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBound {
    pub from: String,
    pub to: String,
}

impl RangeBound {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetType {
    Terms,
    DateHistogram,
    NumericHistogram,
    Sum,
    Avg,
}

/// Facet requests an aggregation over a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub field_name: String,
    #[serde(rename = "type")]
    pub facet_type: FacetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_interval: Option<String>,
}

impl Facet {
    pub fn new(field_name: impl Into<String>, facet_type: FacetType) -> Self {
        Self {
            name: None,
            field_name: field_name.into(),
            facet_type,
            size: None,
            date_interval: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub field_name: String,
    pub order: SortOrder,
}

impl SortField {
    pub fn new(field_name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field_name: field_name.into(),
            order,
        }
    }
}

fn default_datatype() -> String {
    "GSearchRequest".to_string()
}

/// SearchQuery is the full query document sent to `POST .../search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "@datatype", default = "default_datatype")]
    pub datatype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            datatype: default_datatype(),
            q: None,
            offset: None,
            limit: None,
            advanced: None,
            filters: Vec::new(),
            facets: Vec::new(),
            sort: Vec::new(),
        }
    }
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = Some(advanced);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort.push(field);
        self
    }
}

/// DeleteQuery selects the documents removed by `delete_by_query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

/// ErrorBody is the JSON document returned alongside non-2xx statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Read each field on its own so one odd field does not discard the other.
    ///
    /// Numeric or boolean codes are kept in their text form; a non-string
    /// message is ignored.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let code = match value.get("code") {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(code @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Some(code.to_string())
            }
            _ => None,
        };
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string);

        Self { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_id_from_uuid() {
        let uuid = Uuid::parse_str("4a0a2d5c-7a9b-4f4e-9a3b-2f1c0e6d8b71").unwrap();
        let id = IndexId::from(uuid);
        assert_eq!(id.as_str(), "4a0a2d5c-7a9b-4f4e-9a3b-2f1c0e6d8b71");
        assert_eq!(IndexId::new(42).to_string(), "42");
    }

    #[test]
    fn test_ingest_entry_envelope() {
        let entry = GMetaEntry::new("https://example.com/foo/bar", json!({"foo/bar": "some val"}));
        let doc = IngestDocument::from(entry);

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "ingest_type": "GMetaEntry",
                "ingest_data": {
                    "subject": "https://example.com/foo/bar",
                    "visible_to": ["public"],
                    "content": {"foo/bar": "some val"}
                }
            })
        );
    }

    #[test]
    fn test_ingest_list_envelope() {
        let list: GMetaList = vec![
            GMetaEntry::new("https://example.com/a", json!({"n": 1})),
            GMetaEntry::new("https://example.com/a", json!({"n": 2})).with_id("otherentry"),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(IngestDocument::from(list)).unwrap();
        assert_eq!(value["ingest_type"], "GMetaList");
        assert_eq!(value["ingest_data"]["gmeta"].as_array().unwrap().len(), 2);
        assert_eq!(value["ingest_data"]["gmeta"][1]["id"], "otherentry");
        assert!(value["ingest_data"]["gmeta"][0].get("id").is_none());
    }

    #[test]
    fn test_search_query_omits_unset_fields() {
        let value = serde_json::to_value(SearchQuery::new("user query")).unwrap();
        assert_eq!(value, json!({"@datatype": "GSearchRequest", "q": "user query"}));
    }

    #[test]
    fn test_search_query_with_filters_facets_sort() {
        let query = SearchQuery::new("user query")
            .with_limit(5)
            .filter(Filter::Range {
                field_name: "path.to.date".to_string(),
                values: vec![RangeBound::new("*", "2014-11-07")],
            })
            .facet(
                Facet {
                    date_interval: Some("year".to_string()),
                    ..Facet::new("path.to.date", FacetType::DateHistogram)
                }
                .named("Publication Date"),
            )
            .sort_by(SortField::new("path.to.date", SortOrder::Asc));

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["limit"], 5);
        assert_eq!(value["filters"][0]["type"], "range");
        assert_eq!(value["filters"][0]["values"][0]["from"], "*");
        assert_eq!(value["facets"][0]["type"], "date_histogram");
        assert_eq!(value["facets"][0]["name"], "Publication Date");
        assert_eq!(value["sort"][0]["order"], "asc");
    }

    #[test]
    fn test_error_body_partial() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "boom"}"#).unwrap();
        assert_eq!(body.code, None);
        assert_eq!(body.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_error_body_from_mixed_value() {
        let body = ErrorBody::from_value(&json!({"code": 404, "message": "no such index"}));
        assert_eq!(body.code.as_deref(), Some("404"));
        assert_eq!(body.message.as_deref(), Some("no such index"));

        let body = ErrorBody::from_value(&json!({"code": "Conflict", "message": {"detail": "x"}}));
        assert_eq!(body.code.as_deref(), Some("Conflict"));
        assert_eq!(body.message, None);

        assert_eq!(ErrorBody::from_value(&json!(["not", "an", "object"])), ErrorBody::default());
    }
}
