//! Shared helpers for the form integration tests: a scripted transport that
//! records every call, and a tracing subscriber writing to the test output.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use studyroom_transport::{ApiResponse, Result, Transport, TransportError};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

enum Reply {
    Answer(ApiResponse),
    Fail(TransportError),
    Hang,
}

struct Route {
    method: &'static str,
    prefix: String,
    reply: Reply,
}

/// Answers by `(method, path prefix)`; the first matching route wins and
/// unmatched calls get `200` with a `null` body.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(self, method: &'static str, prefix: &str, reply: Reply) -> Self {
        self.routes.lock().unwrap().push(Route {
            method,
            prefix: prefix.to_string(),
            reply,
        });
        self
    }

    pub fn answer(self, method: &'static str, prefix: &str, status: u16, data: Value) -> Self {
        self.route(method, prefix, Reply::Answer(ApiResponse::new(status, data)))
    }

    pub fn fail(self, method: &'static str, prefix: &str, error: TransportError) -> Self {
        self.route(method, prefix, Reply::Fail(error))
    }

    /// Never answers; used to exercise timeouts.
    pub fn hang(self, method: &'static str, prefix: &str) -> Self {
        self.route(method, prefix, Reply::Hang)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.path.starts_with(prefix))
            .count()
    }

    async fn handle(&self, method: &'static str, path: &str, body: Value) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });

        let reply = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .find(|route| route.method == method && path.starts_with(&route.prefix))
                .map(|route| match &route.reply {
                    Reply::Answer(response) => Some(Ok(response.clone())),
                    Reply::Fail(error) => Some(Err(error.clone())),
                    Reply::Hang => None,
                })
        };

        match reply {
            Some(Some(result)) => result,
            Some(None) => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(TransportError::TimeoutError("hung".to_string()))
            }
            None => Ok(ApiResponse::new(200, Value::Null)),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.handle("GET", path, Value::Null).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.handle("POST", path, body).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.handle("PATCH", path, body).await
    }
}
