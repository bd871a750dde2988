use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Index;

use crate::transport::RawResponse;
use crate::{ClientError, Result};

/// Parsed JSON body and HTTP status of a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    data: Value,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// Parse a raw response; an empty body becomes `Value::Null`
    pub(crate) fn from_raw(raw: RawResponse) -> Result<Self> {
        let data = if raw.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&raw.body).map_err(|e| {
                ClientError::InvalidResponse(format!("expected a JSON body: {}", e))
            })?
        };

        Ok(Self::new(raw.status, data))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Iterate over the array under `key`, e.g. `gmeta` in search results.
    /// Yields nothing when the key is missing or not an array.
    pub fn items<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Value> + 'a {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }

    /// Deserialize the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.data)?)
    }
}

impl Index<&str> for ApiResponse {
    type Output = Value;

    /// Missing keys index to `Value::Null`
    fn index(&self, key: &str) -> &Value {
        &self.data[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_null() {
        let response = ApiResponse::from_raw(RawResponse::new(200, "  ")).unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.data().is_null());
    }

    #[test]
    fn test_non_json_body_is_invalid() {
        match ApiResponse::from_raw(RawResponse::new(200, "not valid json")) {
            Err(ClientError::InvalidResponse(msg)) => assert!(msg.contains("JSON")),
            other => panic!("Expected InvalidResponse, got: {:?}", other),
        }
    }

    #[test]
    fn test_items_and_index() {
        let response = ApiResponse::new(
            200,
            json!({
                "total": 2,
                "gmeta": [{"subject": "a"}, {"subject": "b"}]
            }),
        );

        let subjects: Vec<_> = response
            .items("gmeta")
            .map(|entry| entry["subject"].as_str().unwrap())
            .collect();
        assert_eq!(subjects, vec!["a", "b"]);
        assert_eq!(response["total"], 2);
        assert!(response["missing"].is_null());
        assert_eq!(response.items("total").count(), 0);
        assert_eq!(response.items("missing").count(), 0);
    }

    #[test]
    fn test_typed_json() {
        #[derive(Deserialize)]
        struct IndexDoc {
            index_id: String,
            display_name: String,
        }

        let response = ApiResponse::new(
            200,
            json!({"index_id": "abc-123", "display_name": "Test", "description": "x"}),
        );
        let index: IndexDoc = response.json().unwrap();
        assert_eq!(index.index_id, "abc-123");
        assert_eq!(index.display_name, "Test");
    }
}
