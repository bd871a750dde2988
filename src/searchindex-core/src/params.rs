/// Default `offset` sent by a GET search
pub const DEFAULT_SEARCH_OFFSET: u64 = 0;
/// Default `limit` sent by a GET search
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// QueryParams is an insertion-ordered set of query string parameters.
///
/// Keys are unique: setting an existing key replaces its value in place.
/// Absent values are never stored, so they never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryParams::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    /// Set `key` only when `value` is present. A `None` leaves any value the
    /// caller already supplied untouched.
    pub fn set_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Merge `other` into `self`; values from `other` win
    pub fn merge(&mut self, other: QueryParams) -> &mut Self {
        for (key, value) in other.pairs {
            self.set(key, value);
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Options recognized by `GET /v1/index/{index_id}/search`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub offset: u64,
    pub limit: u64,
    pub query_template: Option<String>,
    pub advanced: bool, // Always transmitted, even when false
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            offset: DEFAULT_SEARCH_OFFSET,
            limit: DEFAULT_SEARCH_LIMIT,
            query_template: None,
            advanced: false,
        }
    }
}

impl SearchParams {
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_query_template(mut self, name: impl Into<String>) -> Self {
        self.query_template = Some(name.into());
        self
    }

    pub fn with_advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    /// Merge the query string `q` and these options over `params`
    pub fn apply(&self, q: &str, params: &mut QueryParams) {
        params
            .set("q", q)
            .set("offset", self.offset)
            .set("limit", self.limit)
            .set_opt("query_template", self.query_template.as_deref())
            .set("advanced", self.advanced);
    }
}

/// Selects a subject, and optionally one entry of it, on the entry endpoints.
/// A missing `entry_id` addresses the entry with a null id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryParams {
    pub subject: String,
    pub entry_id: Option<String>,
}

impl EntryParams {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            entry_id: None,
        }
    }

    pub fn with_entry_id(mut self, entry_id: Option<impl Into<String>>) -> Self {
        self.entry_id = entry_id.map(Into::into);
        self
    }

    pub fn apply(&self, params: &mut QueryParams) {
        params
            .set("subject", &self.subject)
            .set_opt("entry_id", self.entry_id.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = QueryParams::new().with("a", 1).with("b", 2);
        params.set("a", 3);

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_set_opt_none_is_omitted() {
        let mut params = QueryParams::new();
        params.set_opt("query_template", None::<&str>);
        assert!(params.is_empty());
        assert!(!params.contains_key("query_template"));
    }

    #[test]
    fn test_set_opt_none_keeps_caller_value() {
        let mut params = QueryParams::new().with("entry_id", "mine");
        params.set_opt("entry_id", None::<&str>);
        assert_eq!(params.get("entry_id"), Some("mine"));
    }

    #[test]
    fn test_search_defaults() {
        let mut params = QueryParams::new();
        SearchParams::default().apply("hello", &mut params);

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("q", "hello"),
                ("offset", "0"),
                ("limit", "10"),
                ("advanced", "false"),
            ]
        );
    }

    #[test]
    fn test_search_named_params_override_caller() {
        let mut params = QueryParams::new().with("limit", 99).with("bypass_visible_to", true);
        SearchParams::default()
            .with_limit(25)
            .with_query_template("my-template")
            .with_advanced(true)
            .apply("title: foo", &mut params);

        assert_eq!(params.get("limit"), Some("25"));
        assert_eq!(params.get("bypass_visible_to"), Some("true"));
        assert_eq!(params.get("query_template"), Some("my-template"));
        assert_eq!(params.get("advanced"), Some("true"));
    }

    #[test]
    fn test_entry_params() {
        let mut params = QueryParams::new();
        EntryParams::new("https://example.com/foo/bar")
            .with_entry_id(None::<String>)
            .apply(&mut params);
        assert_eq!(params.get("subject"), Some("https://example.com/foo/bar"));
        assert!(!params.contains_key("entry_id"));

        let mut params = QueryParams::new();
        EntryParams::new("https://example.com/foo/bar")
            .with_entry_id(Some("foo/bar"))
            .apply(&mut params);
        assert_eq!(params.get("entry_id"), Some("foo/bar"));
    }

    #[test]
    fn test_merge_and_collect() {
        let mut params: QueryParams = vec![("a", "1"), ("b", "2")].into_iter().collect();
        params.merge(QueryParams::new().with("b", "x").with("c", "3"));
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("b"), Some("x"));
        assert_eq!(params.remove("a").as_deref(), Some("1"));
        assert_eq!(params.len(), 2);
    }
}
