//! Model and provider descriptors
//!
//! A [`ModelDescriptor`] is supplied by an external model registry and is
//! immutable for the lifetime of a request. The decoding-parameter contract
//! a model speaks is a closed enum ([`ParameterContract`]) so that adding a
//! third contract shape is an exhaustive, compiler-checked change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Known generative-text providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI and OpenAI-compatible endpoints
    OpenAi,
    /// Anthropic
    Anthropic,
    /// Google (Gemini family)
    Google,
    /// Mistral
    Mistral,
    /// Any provider without a dedicated table entry
    Other,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Google => write!(f, "google"),
            Self::Mistral => write!(f, "mistral"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The decoding-parameter contract a model speaks.
///
/// Reasoning-class models use a different budget parameter name, reject all
/// sampling controls, and accept exactly one temperature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterContract {
    /// Conventional contract: `max_tokens` plus free sampling controls
    Standard,
    /// Reasoning contract: `max_completion_tokens`, no sampling controls
    Reasoning,
}

impl ParameterContract {
    /// Last-resort compatibility shim for descriptors that carry no explicit
    /// contract: infer from well-known reasoning-family name prefixes.
    ///
    /// Registries should set the contract explicitly; prefix matching exists
    /// only so unrecognized identifiers degrade predictably.
    pub fn infer(model_id: &str) -> Self {
        let id = model_id.to_ascii_lowercase();
        let reasoning = id.starts_with("o1")
            || id.starts_with("o3")
            || id.starts_with("o4")
            || id.starts_with("gpt-5");
        if reasoning {
            Self::Reasoning
        } else {
            Self::Standard
        }
    }

    /// Whether this is the reasoning contract.
    pub fn is_reasoning(self) -> bool {
        matches!(self, Self::Reasoning)
    }
}

/// Immutable description of one model at one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier as the provider spells it (e.g. "gpt-4o-mini")
    pub id: String,

    /// Owning provider
    pub provider: ProviderKind,

    /// Context window size in tokens
    pub context_window: u32,

    /// Explicit maximum completion length, when the registry knows it
    pub max_completion_tokens: Option<u32>,

    /// Which decoding-parameter contract the model speaks
    pub contract: ParameterContract,
}

impl ModelDescriptor {
    /// Build a descriptor, inferring the parameter contract from the model
    /// identifier (see [`ParameterContract::infer`]).
    pub fn new(id: impl Into<String>, provider: ProviderKind, context_window: u32) -> Self {
        let id = id.into();
        let contract = ParameterContract::infer(&id);
        Self { id, provider, context_window, max_completion_tokens: None, contract }
    }

    /// Set the explicit maximum completion length.
    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = Some(max);
        self
    }

    /// Override the inferred parameter contract.
    pub fn with_contract(mut self, contract: ParameterContract) -> Self {
        self.contract = contract;
        self
    }

    /// Whether this descriptor is reasoning-class.
    pub fn is_reasoning(&self) -> bool {
        self.contract.is_reasoning()
    }
}
