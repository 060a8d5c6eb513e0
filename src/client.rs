//! CourtListener API client
//!
//! Thin façade over [`Transport`] that adds paginated traversal and a
//! connectivity check.

use crate::config::{Config, ConfigBuilder};
use crate::error::{Error, Result};
use crate::http::{RequestSpec, Transport};
use crate::pagination::{PageIterator, Paginator};
use crate::types::StringMap;
use serde_json::Value;
use tracing::{debug, info};

/// Endpoint requested by [`CourtListenerClient::check_connection`]
const CONNECTION_CHECK_ENDPOINT: &str = "courts/";

/// Client for the CourtListener REST API
#[derive(Debug, Clone)]
pub struct CourtListenerClient {
    transport: Transport,
}

impl CourtListenerClient {
    /// Create a client using the `reqwest` backend
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(ConfigBuilder::from_env().build()?)
    }

    /// Create a client over an existing transport
    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// The underlying transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Execute a request with retries
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value> {
        self.transport.execute(spec).await
    }

    /// GET an endpoint
    pub async fn get(&self, endpoint: &str, params: StringMap) -> Result<Value> {
        self.transport.get(endpoint, params).await
    }

    /// POST a JSON body
    pub async fn post_json(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.transport.post_json(endpoint, body).await
    }

    /// POST form-encoded data
    pub async fn post_form(&self, endpoint: &str, data: StringMap) -> Result<Value> {
        self.transport.post_form(endpoint, data).await
    }

    /// Push-style traversal of a paginated endpoint
    pub fn paginate(&self, endpoint: impl Into<String>, params: StringMap) -> Paginator {
        Paginator::new(self.transport.clone(), endpoint, params)
    }

    /// Pull-style traversal of a paginated endpoint
    pub fn page_iter(&self, endpoint: impl Into<String>, params: StringMap) -> PageIterator {
        PageIterator::new(self.transport.clone(), endpoint, params)
    }

    /// Verify the API is reachable and the token is accepted
    pub async fn check_connection(&self) -> Result<()> {
        debug!("Checking connection to {}", self.transport.config().base_url());

        match self.get(CONNECTION_CHECK_ENDPOINT, StringMap::new()).await {
            Ok(_) => {
                info!("Connection check succeeded");
                Ok(())
            }
            Err(e) => Err(Error::ConnectionCheck {
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::mock::{
        ok, scripted_transport, status, test_config, RecordingSleeper, ScriptedBackend,
    };
    use serde_json::json;

    fn client_for(backend: &std::sync::Arc<ScriptedBackend>) -> CourtListenerClient {
        let sleeper = RecordingSleeper::new();
        CourtListenerClient::with_transport(scripted_transport(
            test_config().max_retries(0),
            backend,
            &sleeper,
        ))
    }

    #[tokio::test]
    async fn test_check_connection_ok() {
        let backend = ScriptedBackend::new(vec![ok(json!({"results": []}))]);
        client_for(&backend).check_connection().await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url.as_str(),
            "https://api.test/api/rest/v4/courts/"
        );
    }

    #[tokio::test]
    async fn test_check_connection_failure() {
        let backend = ScriptedBackend::new(vec![status(401)]);
        let err = client_for(&backend).check_connection().await.unwrap_err();

        match err {
            Error::ConnectionCheck { message } => assert_eq!(message, "Invalid API token"),
            other => panic!("Expected ConnectionCheck, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_passes_through() {
        let backend = ScriptedBackend::new(vec![ok(json!({"id": 1})), status(404)]);
        let client = client_for(&backend);

        assert_eq!(
            client.get("/opinions/1/", StringMap::new()).await.unwrap(),
            json!({"id": 1})
        );
        let err = client.get("/opinions/2/", StringMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_paginate_and_page_iter_share_transport() {
        let backend = ScriptedBackend::new(vec![
            ok(json!({"next": null, "results": [{"id": 1}]})),
            ok(json!({"next": null, "results": [{"id": 1}]})),
        ]);
        let client = client_for(&backend);

        let pushed = client
            .paginate("/search/", StringMap::new())
            .collect_all()
            .await
            .unwrap();
        let pulled = client
            .page_iter("/search/", StringMap::new())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(pushed, pulled);
        assert_eq!(backend.attempts(), 2);
    }
}
