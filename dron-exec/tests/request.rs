use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dron_core::{HttpMethod, Step};
use dron_exec::executor::http::{HttpClient, HttpRequestParts, HttpResponseParts, TransportError};
use dron_exec::executor::ResolvedRequest;
use dron_exec::{ExecutorConfig, RequestExecutor};

struct EchoClient;

#[async_trait]
impl HttpClient for EchoClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, TransportError> {
        Ok(HttpResponseParts {
            status: 200,
            body: format!("{} {}", req.method, req.url).into_bytes(),
        })
    }
}

fn executor(config: ExecutorConfig) -> RequestExecutor {
    RequestExecutor::new(Arc::new(EchoClient), config)
}

#[test]
fn builds_headers_in_order_and_keeps_duplicates() {
    let step = Step::new("s", HttpMethod::Post, " https://api.test/x ")
        .unwrap()
        .with_header("Accept", "a")
        .unwrap()
        .with_header("Accept", "b")
        .unwrap()
        .with_body("payload")
        .unwrap();
    let req = executor(ExecutorConfig::default()).build_request(&step).unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.url.as_str(), "https://api.test/x");
    assert_eq!(
        req.headers,
        vec![
            ("Accept".to_string(), "a".to_string()),
            ("Accept".to_string(), "b".to_string())
        ]
    );
    assert_eq!(req.body, b"payload");
}

#[test]
fn get_sends_no_body() {
    let step = Step::new("s", HttpMethod::Get, "http://api.test/")
        .unwrap()
        .with_body("ignored")
        .unwrap();
    let req = executor(ExecutorConfig::default()).build_request(&step).unwrap();
    assert!(req.body.is_empty());
    assert_eq!(ResolvedRequest::from_step(&step).body, "");
}

#[test]
fn rejects_bad_urls() {
    let exec = executor(ExecutorConfig::default());
    for url in ["not a url", "ftp://api.test/file", "{{A.host}}/x"] {
        let step = Step::new("s", HttpMethod::Get, url).unwrap();
        assert!(
            matches!(exec.build_request(&step), Err(TransportError::InvalidRequest(_))),
            "{url} should be rejected"
        );
    }
}

#[test]
fn custom_methods_need_enabling() {
    let step = Step::new("s", "PURGE".parse::<HttpMethod>().unwrap(), "http://api.test/").unwrap();
    assert!(executor(ExecutorConfig::default()).build_request(&step).is_err());

    let config = ExecutorConfig {
        extra_methods: BTreeSet::from(["PURGE".to_string()]),
        ..ExecutorConfig::default()
    };
    let req = executor(config).build_request(&step).unwrap();
    assert_eq!(req.method, "PURGE");
}

#[tokio::test]
async fn run_returns_body_text() {
    let step = Step::new("s", HttpMethod::Delete, "http://api.test/item/1").unwrap();
    let body = executor(ExecutorConfig::default()).run(&step).await.unwrap();
    assert_eq!(body, "DELETE http://api.test/item/1");
}
