use searchindex_core::IndexId;
use tracing::info;

/// Notified once per facade call, before the request is sent.
///
/// Only the operation name and index id are passed; payloads never are.
pub trait CallObserver: Send + Sync {
    fn on_call(&self, operation: &str, index_id: &IndexId);
}

/// Default observer, emits one `info` event per call
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn on_call(&self, operation: &str, index_id: &IndexId) {
        info!(operation, index_id = %index_id, "IndexClient.{}({})", operation, index_id);
    }
}

impl<F> CallObserver for F
where
    F: Fn(&str, &IndexId) + Send + Sync,
{
    fn on_call(&self, operation: &str, index_id: &IndexId) {
        self(operation, index_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |operation: &str, index_id: &IndexId| {
            sink.lock().unwrap().push(format!("{}:{}", operation, index_id));
        };

        observer.on_call("get_index", &IndexId::from("abc-123"));
        TracingObserver.on_call("get_index", &IndexId::from("abc-123"));

        assert_eq!(*seen.lock().unwrap(), vec!["get_index:abc-123".to_string()]);
    }
}
