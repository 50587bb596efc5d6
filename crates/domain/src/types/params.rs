//! Decoding-parameter request and response shapes
//!
//! [`CompletionOptions`] is what a caller asks for; [`DecodingParams`] is the
//! finalized set the budget resolver produces. Serialization skips unset
//! fields so the wire payload only carries parameters the target contract
//! actually accepts; in particular, exactly one of `max_tokens` /
//! `max_completion_tokens` is ever set.

use serde::{Deserialize, Serialize};

/// Caller-supplied decoding preferences for one completion request.
///
/// Every field is optional; absent fields defer to the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Requested completion length in tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus-sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Presence penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Frequency penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    /// Whether to return log-probabilities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,

    /// How many top log-probabilities to return per token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<u32>,

    /// Per-token logit biases, keyed by token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CompletionOptions {
    /// Options requesting a specific completion length, nothing else.
    pub fn with_max_output_tokens(max: u32) -> Self {
        Self { max_output_tokens: Some(max), ..Self::default() }
    }
}

/// Finalized, safety-capped decoding parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodingParams {
    /// Completion budget under the standard contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Completion budget under the reasoning contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus-sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Presence penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Frequency penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    /// Whether to return log-probabilities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,

    /// How many top log-probabilities to return per token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<u32>,

    /// Per-token logit biases, keyed by token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<serde_json::Map<String, serde_json::Value>>,
}

impl DecodingParams {
    /// The effective completion budget, regardless of which parameter name
    /// carries it.
    pub fn budget(&self) -> Option<u32> {
        self.max_tokens.or(self.max_completion_tokens)
    }
}
