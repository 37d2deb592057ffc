//! Configuration types for extraction runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::SecretString;

/// Model used when the caller does not pass an explicit [`GraphConfig`].
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Instruction used when the operator leaves the prompt empty.
pub const DEFAULT_PROMPT: &str = "Make a table that specifies the main product on this page, \
not the suggested products. The table should contain the Product name, McKesson #, \
Manufacturer #, Brand #, Manufacturer, Country of Origin, Active Ingredients, Application, \
Container Type, Dimensions, Form, Sterility, Type, UNSPSC Code, Volume. If Active Ingredients \
are available in the features tab, use the definition to replace the Active Ingredients field \
from the Product Specifications";

/// Page text sent to the model is cut at this many bytes.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 100_000;

/// User agent for page fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("catalog-extraction/", env!("CARGO_PKG_VERSION"));

/// Configuration of the extraction capability (model + credentials).
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// API key for the model service
    pub api_key: SecretString,

    /// Model identifier. Default: `gpt-4-turbo`.
    pub model: String,

    /// Log per-node execution details after every extraction.
    ///
    /// Default: true.
    pub verbose: bool,

    /// API base URL override (proxies, Azure, tests)
    pub base_url: Option<String>,

    /// Sampling temperature. Default: 0.0.
    pub temperature: f32,

    /// Upper bound on page text sent to the model, in bytes.
    pub max_content_chars: usize,
}

impl GraphConfig {
    /// The default configuration keyed by the caller's API key.
    pub fn default_for(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            verbose: true,
            base_url: None,
            temperature: 0.0,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Toggle verbose execution logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the page text limit.
    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }
}

/// What a run does when one URL fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure; later URLs are never fetched.
    #[default]
    Abort,

    /// Record the failure and continue with the next URL.
    Isolate,
}

/// Per-run settings for the extraction runner.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Custom instruction. `None` or empty falls back to [`DEFAULT_PROMPT`].
    pub prompt: Option<String>,

    /// Failure handling. Default: [`FailurePolicy::Abort`].
    pub failure_policy: FailurePolicy,

    /// URLs in flight at once. Default: 1 (strictly sequential).
    ///
    /// Records and progress notifications stay in input order at any value.
    pub concurrency: usize,

    /// Page fetch timeout. Default: none (client default).
    pub fetch_timeout: Option<Duration>,

    /// User agent for page fetches.
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            prompt: None,
            failure_policy: FailurePolicy::Abort,
            concurrency: 1,
            fetch_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RunConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the custom prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the number of URLs processed concurrently (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set a page fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the fetch user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The instruction actually sent: the custom prompt replaces the default
    /// wholesale; only a missing or empty prompt falls back.
    pub fn effective_prompt(&self) -> &str {
        match self.prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => DEFAULT_PROMPT,
        }
    }
}
