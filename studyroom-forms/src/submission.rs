use crate::context::FormContext;
use crate::key::FormKey;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use studyroom_error::{FormError, Result};
use studyroom_transport::{ApiResponse, Transport, TransportError};
use tracing::{debug, warn};

/// Shown when a submission fails and the form has no message of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "서버 오류가 발생했습니다. 다시 시도해주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

/// The single request a context serializes into on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
}

impl OutboundRequest {
    /// A bodyless read; `body` stays `null`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: Value::Null,
        }
    }

    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::with_body(Method::Post, path, body)
    }

    pub fn patch(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Self::with_body(Method::Patch, path, body)
    }

    fn with_body(method: Method, path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        let body = serde_json::to_value(body).map_err(|e| FormError::submission(None, e.to_string()))?;
        Ok(Self {
            method,
            path: path.into(),
            body,
        })
    }

    pub async fn dispatch<T: Transport + ?Sized>(&self, transport: &T) -> studyroom_transport::Result<ApiResponse> {
        match self.method {
            Method::Get => transport.get(&self.path).await,
            Method::Post => transport.post(&self.path, self.body.clone()).await,
            Method::Patch => transport.patch(&self.path, self.body.clone()).await,
        }
    }
}

/// Turns a valid context into its outbound request.
pub trait SubmissionBuilder<K: FormKey, S: FormKey>: Send + Sync {
    fn build(&self, context: &FormContext<K, S>) -> Result<OutboundRequest>;

    /// User-visible message for a failed submission.
    fn failure_message(&self) -> &str {
        DEFAULT_FAILURE_MESSAGE
    }
}

impl<K, S, F> SubmissionBuilder<K, S> for F
where
    K: FormKey,
    S: FormKey,
    F: Fn(&FormContext<K, S>) -> Result<OutboundRequest> + Send + Sync,
{
    fn build(&self, context: &FormContext<K, S>) -> Result<OutboundRequest> {
        self(context)
    }
}

/// A submission that passed the gate and is waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub(crate) context: usize,
    pub(crate) ticket: u64,
    pub(crate) request: OutboundRequest,
}

impl PendingSubmission {
    pub fn context(&self) -> usize {
        self.context
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn request(&self) -> &OutboundRequest {
        &self.request
    }

    /// Sends the request, giving up after `timeout`. Non-`2xx` answers are
    /// failures.
    pub async fn send<T: Transport + ?Sized>(self, transport: &T, timeout: Duration) -> SubmissionResponse {
        debug!(path = %self.request.path, ticket = self.ticket, "submission sent");
        let result = match tokio::time::timeout(timeout, self.request.dispatch(transport)).await {
            Ok(result) => result.and_then(ApiResponse::into_success),
            Err(_) => {
                warn!(path = %self.request.path, "submission timed out");
                Err(TransportError::TimeoutError(format!(
                    "no answer within {} ms",
                    timeout.as_millis()
                )))
            }
        };
        SubmissionResponse {
            context: self.context,
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResponse {
    pub context: usize,
    pub ticket: u64,
    pub result: studyroom_transport::Result<ApiResponse>,
}
