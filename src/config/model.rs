//! StepConfig struct definition and default implementation.

use serde::{Deserialize, Serialize};

/// Configuration for one prompt step.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    // =========================================================================
    // Endpoint settings
    // =========================================================================
    /// URL of the text-generation endpoint. Required, but may come from an
    /// override instead of the file.
    pub endpoint: String,

    /// Name of the environment variable holding a bearer token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    // =========================================================================
    // Call policy
    // =========================================================================
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt for timeouts and transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each one after.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    // =========================================================================
    // Build log
    // =========================================================================
    /// Step name written into every record.
    #[serde(default = "default_step_name")]
    pub step_name: String,

    /// Whether to write `Prompt: <resolved prompt>` before calling.
    #[serde(default = "default_true")]
    pub echo_prompt: bool,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: None,
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            step_name: default_step_name(),
            echo_prompt: default_true(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_step_name() -> String {
    "chatgpt".to_string()
}

fn default_true() -> bool {
    true
}
