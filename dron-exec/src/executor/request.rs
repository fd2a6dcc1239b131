use std::sync::Arc;

use dron_core::{HeaderPair, Step};

use crate::executor::http::{HttpClient, HttpRequestParts, TransportError};
use crate::executor::types::ExecutorConfig;

/// The request a step produced, as rendered at send time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<HeaderPair>,
    pub body: String,
}

impl ResolvedRequest {
    pub fn from_step(step: &Step) -> Self {
        Self {
            method: step.method.to_string(),
            url: step.url.render(),
            headers: step
                .headers
                .iter()
                .map(|h| HeaderPair {
                    name: h.name.clone(),
                    value: h.value.render(),
                })
                .collect(),
            body: if step.method.allows_body() {
                step.body.render()
            } else {
                String::new()
            },
        }
    }
}

/// Sends one step. Holds no per-call state, so one instance serves any number of runs.
pub struct RequestExecutor {
    http: Arc<dyn HttpClient>,
    config: ExecutorConfig,
}

impl RequestExecutor {
    pub fn new(http: Arc<dyn HttpClient>, config: ExecutorConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn build_request(&self, step: &Step) -> Result<HttpRequestParts, TransportError> {
        if !self.config.allows_method(&step.method) {
            return Err(TransportError::InvalidRequest(format!(
                "method {} is not enabled",
                step.method
            )));
        }

        let resolved = ResolvedRequest::from_step(step);
        let url = url::Url::parse(resolved.url.trim()).map_err(|e| {
            TransportError::InvalidRequest(format!("invalid url `{}`: {e}", resolved.url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidRequest(format!(
                "unsupported url scheme `{}`",
                url.scheme()
            )));
        }

        let mut headers = Vec::with_capacity(resolved.headers.len());
        for h in resolved.headers {
            let name = h.name.trim();
            if name.is_empty() {
                return Err(TransportError::InvalidRequest(
                    "header name must not be empty".to_string(),
                ));
            }
            headers.push((name.to_string(), h.value));
        }

        Ok(HttpRequestParts {
            method: resolved.method,
            url,
            headers,
            body: resolved.body.into_bytes(),
        })
    }

    /// Sends the step's already-resolved request and returns the response body as text.
    pub async fn run(&self, step: &Step) -> Result<String, TransportError> {
        let req = self.build_request(step)?;
        tracing::debug!(
            step_id = %step.id,
            method = %req.method,
            url = %req.url,
            headers = req.headers.len(),
            body_bytes = req.body.len(),
            "sending request"
        );

        let resp = self
            .http
            .send(req, self.config.timeout, self.config.max_response_bytes)
            .await?;

        tracing::debug!(step_id = %step.id, status = resp.status, body_bytes = resp.body.len(), "response received");

        if self.config.fail_on_error_status && !resp.is_success() {
            return Err(TransportError::Status {
                status: resp.status,
                body: resp.body_text(),
            });
        }
        Ok(resp.body_text())
    }
}
