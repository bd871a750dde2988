use reqwest::Method;
use searchindex_core::{index_path, ClientConfig, EntryParams, IndexId, QueryParams, SearchParams};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::api_error::{ErrorTranslator, SearchErrorTranslator};
use crate::authorizer::Authorizer;
use crate::observer::{CallObserver, TracingObserver};
use crate::response::ApiResponse;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::{ClientError, Result};

/// Search index REST API client
///
/// Holds no per-call state; clone it or share it behind an `Arc`.
#[derive(Clone)]
pub struct IndexClient {
    transport: Arc<dyn Transport>,
    authorizer: Option<Arc<dyn Authorizer>>,
    translator: Arc<dyn ErrorTranslator>,
    observer: Arc<dyn CallObserver>,
}

/// Assembles an [`IndexClient`] from its collaborators
pub struct IndexClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    translator: Arc<dyn ErrorTranslator>,
    observer: Arc<dyn CallObserver>,
}

impl Default for IndexClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            authorizer: None,
            translator: Arc::new(SearchErrorTranslator),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl IndexClientBuilder {
    /// Configuration for the default reqwest transport
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn authorizer(self, authorizer: impl Authorizer + 'static) -> Self {
        self.shared_authorizer(Arc::new(authorizer))
    }

    pub fn shared_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Replace the reqwest transport; `config` is then unused
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn error_translator(mut self, translator: impl ErrorTranslator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    pub fn observer(mut self, observer: impl CallObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Fails for non-token authorizers and unusable base URLs
    pub fn build(self) -> Result<IndexClient> {
        if let Some(authorizer) = &self.authorizer {
            let kind = authorizer.kind();
            if !kind.is_token_based() {
                return Err(ClientError::UnsupportedAuthorizer(kind));
            }
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };

        Ok(IndexClient {
            transport,
            authorizer: self.authorizer,
            translator: self.translator,
            observer: self.observer,
        })
    }
}

impl IndexClient {
    /// Create a client for `base_url` authorized by `authorizer`
    pub fn new(base_url: impl Into<String>, authorizer: impl Authorizer + 'static) -> Result<Self> {
        Self::builder()
            .base_url(base_url)
            .authorizer(authorizer)
            .build()
    }

    pub fn builder() -> IndexClientBuilder {
        IndexClientBuilder::default()
    }

    //
    // Generic requests
    //

    pub async fn get(&self, path: &str, params: QueryParams) -> Result<ApiResponse> {
        self.request(Method::GET, path, params, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
        params: QueryParams,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(data)?;
        self.request(Method::POST, path, params, Some(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
        params: QueryParams,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(data)?;
        self.request(Method::PUT, path, params, Some(body)).await
    }

    pub async fn delete(&self, path: &str, params: QueryParams) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, params, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        params: QueryParams,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let authorization = match &self.authorizer {
            Some(authorizer) => Some(authorizer.authorization_header().await?),
            None => None,
        };

        let request = HttpRequest {
            method,
            path: path.to_string(),
            params,
            body,
            authorization,
        };
        let raw = self.transport.send(request).await?;

        if !raw.is_success() {
            let err = self.translator.translate(raw.status, &raw.body);
            warn!(status = err.status, code = ?err.code, path = %path, "API request failed");
            return Err(ClientError::Api(err));
        }

        ApiResponse::from_raw(raw)
    }

    //
    // Index management
    //

    /// `GET /v1/index/{index_id}`
    pub async fn get_index(
        &self,
        index_id: impl Into<IndexId>,
        params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("get_index", &index_id);
        self.get(&index_path(&index_id, &[]), params).await
    }

    //
    // Search queries
    //

    /// `GET /v1/index/{index_id}/search`
    ///
    /// `offset`, `limit` and `advanced` are always sent; `query_template`
    /// only when set. Named options override same-named entries in `params`.
    pub async fn search(
        &self,
        index_id: impl Into<IndexId>,
        q: &str,
        options: &SearchParams,
        mut params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        options.apply(q, &mut params);

        self.observer.on_call("search", &index_id);
        self.get(&index_path(&index_id, &["search"]), params).await
    }

    /// `POST /v1/index/{index_id}/search` with a full query document,
    /// typically a [`searchindex_core::SearchQuery`]
    pub async fn post_search<T: Serialize + ?Sized>(
        &self,
        index_id: impl Into<IndexId>,
        data: &T,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("post_search", &index_id);
        self.post(&index_path(&index_id, &["search"]), data, QueryParams::new())
            .await
    }

    //
    // Bulk data indexing
    //

    /// `POST /v1/index/{index_id}/ingest` with a GMetaEntry or GMetaList
    /// envelope
    pub async fn ingest<T: Serialize + ?Sized>(
        &self,
        index_id: impl Into<IndexId>,
        data: &T,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("ingest", &index_id);
        self.post(&index_path(&index_id, &["ingest"]), data, QueryParams::new())
            .await
    }

    /// `POST /v1/index/{index_id}/delete_by_query`
    pub async fn delete_by_query<T: Serialize + ?Sized>(
        &self,
        index_id: impl Into<IndexId>,
        data: &T,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("delete_by_query", &index_id);
        self.post(
            &index_path(&index_id, &["delete_by_query"]),
            data,
            QueryParams::new(),
        )
        .await
    }

    //
    // Subjects
    //

    /// `GET /v1/index/{index_id}/subject`
    pub async fn get_subject(
        &self,
        index_id: impl Into<IndexId>,
        subject: &str,
        mut params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        params.set("subject", subject);

        self.observer.on_call("get_subject", &index_id);
        self.get(&index_path(&index_id, &["subject"]), params).await
    }

    /// `DELETE /v1/index/{index_id}/subject`, removing every entry of the
    /// subject
    pub async fn delete_subject(
        &self,
        index_id: impl Into<IndexId>,
        subject: &str,
        mut params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        params.set("subject", subject);

        self.observer.on_call("delete_subject", &index_id);
        self.delete(&index_path(&index_id, &["subject"]), params)
            .await
    }

    //
    // Entries
    //

    /// `GET /v1/index/{index_id}/entry`
    ///
    /// With `entry_id` of `None` the entry with a null id is returned.
    pub async fn get_entry(
        &self,
        index_id: impl Into<IndexId>,
        subject: &str,
        entry_id: Option<&str>,
        mut params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        EntryParams::new(subject)
            .with_entry_id(entry_id)
            .apply(&mut params);

        self.observer.on_call("get_entry", &index_id);
        self.get(&index_path(&index_id, &["entry"]), params).await
    }

    /// `POST /v1/index/{index_id}/entry`
    pub async fn create_entry<T: Serialize + ?Sized>(
        &self,
        index_id: impl Into<IndexId>,
        data: &T,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("create_entry", &index_id);
        self.post(&index_path(&index_id, &["entry"]), data, QueryParams::new())
            .await
    }

    /// `PUT /v1/index/{index_id}/entry`
    pub async fn update_entry<T: Serialize + ?Sized>(
        &self,
        index_id: impl Into<IndexId>,
        data: &T,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("update_entry", &index_id);
        self.put(&index_path(&index_id, &["entry"]), data, QueryParams::new())
            .await
    }

    /// `DELETE /v1/index/{index_id}/entry`
    pub async fn delete_entry(
        &self,
        index_id: impl Into<IndexId>,
        subject: &str,
        entry_id: Option<&str>,
        mut params: QueryParams,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        EntryParams::new(subject)
            .with_entry_id(entry_id)
            .apply(&mut params);

        self.observer.on_call("delete_entry", &index_id);
        self.delete(&index_path(&index_id, &["entry"]), params).await
    }

    //
    // Query templates
    //

    /// `GET /v1/index/{index_id}/query_template/{template_name}`
    pub async fn get_query_template(
        &self,
        index_id: impl Into<IndexId>,
        template_name: &str,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("get_query_template", &index_id);
        self.get(
            &index_path(&index_id, &["query_template", template_name]),
            QueryParams::new(),
        )
        .await
    }

    /// `GET /v1/index/{index_id}/query_template`
    pub async fn get_query_template_list(
        &self,
        index_id: impl Into<IndexId>,
    ) -> Result<ApiResponse> {
        let index_id = index_id.into();
        self.observer.on_call("get_query_template_list", &index_id);
        self.get(&index_path(&index_id, &["query_template"]), QueryParams::new())
            .await
    }
}
