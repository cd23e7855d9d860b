//! Turns a [`RequestDescriptor`] into one REQUEST event, one network call and
//! exactly one terminal event.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::ApiFailure;
use tracing::{debug, warn};

use crate::{
    events::{Operation, Payload, StoreEvent},
    store::Store,
    transport::{ApiRequest, ApiResponse, RequestBody, Transport, TransportError},
};

pub type SuccessHook<T> = Box<dyn FnOnce(&ApiResponse<T>) -> Result<Payload, ApiFailure> + Send>;
pub type FailureHook = Box<dyn FnOnce(ApiFailure) -> ApiFailure + Send>;

pub struct RequestDescriptor<T> {
    pub operation: Operation,
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
    pub query: Vec<(String, String)>,
    pub on_success: Option<SuccessHook<T>>,
    pub on_failure: Option<FailureHook>,
}

impl<T> RequestDescriptor<T> {
    pub fn new(operation: Operation, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            on_success: None,
            on_failure: None,
        }
    }

    pub fn get(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    pub fn put(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PUT, path)
    }

    pub fn delete(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn on_success(
        mut self,
        hook: impl FnOnce(&ApiResponse<T>) -> Result<Payload, ApiFailure> + Send + 'static,
    ) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_failure(mut self, hook: impl FnOnce(ApiFailure) -> ApiFailure + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success { status: u16, data: T },
    Failure { status: Option<u16>, error: ApiFailure },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Failure { status, .. } => *status,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ApiFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

impl From<TransportError> for ApiFailure {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Network(message) => ApiFailure::network(message),
            TransportError::Status { status, body } => ApiFailure::from_status(status, &body),
            TransportError::MalformedBody { status, message } => {
                ApiFailure::malformed(status, message)
            }
        }
    }
}

#[derive(Clone)]
pub struct ActionPipeline {
    transport: Arc<dyn Transport>,
    store: Arc<Store>,
}

impl ActionPipeline {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<Store>) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub async fn run<T>(&self, descriptor: RequestDescriptor<T>) -> Outcome<T>
    where
        T: DeserializeOwned + Clone + Send,
        Payload: From<T>,
    {
        let RequestDescriptor {
            operation,
            method,
            path,
            body,
            query,
            on_success,
            on_failure,
        } = descriptor;

        self.store.dispatch(StoreEvent::request(operation));

        let request = ApiRequest {
            method,
            path,
            body,
            query,
        };
        let result = match self.transport.send(request).await {
            Ok(raw) => decode::<T>(raw),
            Err(err) => Err(ApiFailure::from(err)),
        };

        let settled = result.and_then(|response| {
            let payload = match on_success {
                Some(hook) => hook(&response)?,
                None => Payload::from(response.data.clone()),
            };
            Ok((response, payload))
        });

        match settled {
            Ok((response, payload)) => {
                debug!(
                    operation = operation.names().success,
                    status = response.status,
                    "pipeline: request succeeded"
                );
                self.store.dispatch(StoreEvent::success(operation, payload));
                Outcome::Success {
                    status: response.status,
                    data: response.data,
                }
            }
            Err(error) => {
                let error = match on_failure {
                    Some(hook) => hook(error),
                    None => error,
                };
                warn!(
                    operation = operation.names().failure,
                    status = ?error.status,
                    kind = ?error.kind,
                    "pipeline: request failed"
                );
                self.store
                    .dispatch(StoreEvent::failure(operation, error.clone()));
                Outcome::Failure {
                    status: error.status,
                    error,
                }
            }
        }
    }
}

fn decode<T: DeserializeOwned>(raw: ApiResponse<Value>) -> Result<ApiResponse<T>, ApiFailure> {
    let status = raw.status;
    serde_json::from_value::<T>(raw.data)
        .map(|data| ApiResponse { status, data })
        .map_err(|e| ApiFailure::malformed(status, e.to_string()))
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
