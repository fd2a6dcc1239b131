use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Per-request timeout; a request that exceeds it fails the run.
    pub timeout: Duration,
    pub max_response_bytes: usize,
    /// Treat non-2xx answers as transport failures.
    pub fail_on_error_status: bool,
    /// Upper-cased method tokens beyond GET/POST/PUT/DELETE/PATCH/HEAD/OPTIONS that may be sent.
    pub extra_methods: BTreeSet<String>,
    /// 0, the default, disables redirects.
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            fail_on_error_status: true,
            extra_methods: BTreeSet::new(),
            max_redirects: 0,
            user_agent: concat!("dron-exec/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn allows_method(&self, method: &dron_core::HttpMethod) -> bool {
        !method.is_custom() || self.extra_methods.contains(method.as_str())
    }
}
