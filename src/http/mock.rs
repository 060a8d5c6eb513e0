//! In-memory backend and sleeper for deterministic tests

use super::backend::{HttpBackend, PreparedRequest, RawResponse, SendError, Sleeper};
use super::transport::Transport;
use crate::config::{Config, ConfigBuilder};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) type Outcome = std::result::Result<RawResponse, SendError>;

/// Replays scripted outcomes in order, then repeats the fallback (if any)
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Option<Outcome>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    pub(crate) fn repeating(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(outcome),
            ..Self::default()
        })
    }

    pub(crate) fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(&self, request: &PreparedRequest) -> Outcome {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(SendError::Other("script exhausted".to_string())))
    }
}

/// Records requested sleeps and returns immediately
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub(crate) fn test_config() -> ConfigBuilder {
    Config::builder()
        .api_token("test-token")
        .base_url("https://api.test/api/rest/v4/")
        .retry_delay(Duration::from_millis(100))
        .rate_limit_delay(Duration::from_millis(250))
}

pub(crate) fn scripted_transport(
    config: ConfigBuilder,
    backend: &Arc<ScriptedBackend>,
    sleeper: &Arc<RecordingSleeper>,
) -> Transport {
    Transport::with_backend(config.build().unwrap(), backend.clone(), sleeper.clone()).unwrap()
}

pub(crate) fn ok(value: Value) -> Outcome {
    Ok(RawResponse::json(&value))
}

pub(crate) fn status(code: u16) -> Outcome {
    Ok(RawResponse::new(
        StatusCode::from_u16(code).unwrap(),
        HeaderMap::new(),
        "",
    ))
}

pub(crate) fn status_with_retry_after(code: u16, seconds: &'static str) -> Outcome {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static(seconds));
    Ok(RawResponse::new(
        StatusCode::from_u16(code).unwrap(),
        headers,
        "",
    ))
}

pub(crate) fn timeout() -> Outcome {
    Err(SendError::Timeout("operation timed out".to_string()))
}

pub(crate) fn connect_failure() -> Outcome {
    Err(SendError::Connect("connection refused".to_string()))
}
