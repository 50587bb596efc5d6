//! Deterministic decoding-parameter resolution
//!
//! Maps a model descriptor (plus an optional caller request) to a finalized,
//! safety-capped parameter set. Pure: no I/O, no hidden state, and it never
//! fails: a descriptor the tables know nothing about falls through to the
//! global fallback.
//!
//! Budget resolution order:
//! 1. caller-requested completion length, when positive
//! 2. the descriptor's explicit maximum, when positive
//! 3. the per-provider default table
//! 4. the global fallback, itself capped at the hard safety ceiling
//!
//! A second, independent pass then caps the result by the model family's
//! ceiling (longest matching name fragment wins; unmatched models get their
//! provider's generic ceiling).

use rivulet_domain::constants::{
    family_ceilings, provider_default_completion_tokens, provider_generic_ceiling,
    GLOBAL_MAX_COMPLETION_TOKENS, HARD_COMPLETION_CEILING, REASONING_FIXED_TEMPERATURE,
};
use rivulet_domain::{CompletionOptions, DecodingParams, ModelDescriptor, ParameterContract};
use tracing::debug;

/// Deterministic resolver for per-request decoding parameters.
pub struct TokenBudgetResolver;

impl TokenBudgetResolver {
    /// Resolve the finalized decoding parameters for one request.
    pub fn resolve(
        model: &ModelDescriptor,
        options: Option<&CompletionOptions>,
    ) -> DecodingParams {
        let requested = options.and_then(|o| o.max_output_tokens).filter(|&v| v > 0);

        let base = requested
            .or_else(|| model.max_completion_tokens.filter(|&v| v > 0))
            .or_else(|| provider_default_completion_tokens(model.provider))
            .unwrap_or(GLOBAL_MAX_COMPLETION_TOKENS.min(HARD_COMPLETION_CEILING));

        let ceiling = Self::family_ceiling(model);
        let budget = base.min(ceiling);

        debug!(
            model = %model.id,
            provider = %model.provider,
            base,
            ceiling,
            budget,
            reasoning = model.is_reasoning(),
            "resolved completion budget"
        );

        match model.contract {
            ParameterContract::Reasoning => Self::reasoning_params(budget),
            ParameterContract::Standard => Self::standard_params(budget, options),
        }
    }

    /// Family-specific output ceiling for a model.
    ///
    /// The longest fragment of the provider's table contained in the model
    /// identifier wins; models matching no fragment get the provider's
    /// generic ceiling.
    fn family_ceiling(model: &ModelDescriptor) -> u32 {
        let id = model.id.to_ascii_lowercase();
        family_ceilings(model.provider)
            .iter()
            .filter(|(fragment, _)| id.contains(fragment))
            .max_by_key(|(fragment, _)| fragment.len())
            .map(|&(_, ceiling)| ceiling)
            .unwrap_or_else(|| provider_generic_ceiling(model.provider))
    }

    /// Reasoning contract: budget under `max_completion_tokens`, sampling
    /// controls stripped, temperature pinned to the one accepted value.
    fn reasoning_params(budget: u32) -> DecodingParams {
        DecodingParams {
            max_completion_tokens: Some(budget),
            temperature: Some(REASONING_FIXED_TEMPERATURE),
            ..DecodingParams::default()
        }
    }

    /// Standard contract: budget under `max_tokens`, caller sampling options
    /// passed through unmodified.
    fn standard_params(budget: u32, options: Option<&CompletionOptions>) -> DecodingParams {
        let mut params = DecodingParams { max_tokens: Some(budget), ..DecodingParams::default() };
        if let Some(options) = options {
            params.temperature = options.temperature;
            params.top_p = options.top_p;
            params.presence_penalty = options.presence_penalty;
            params.frequency_penalty = options.frequency_penalty;
            params.logprobs = options.logprobs;
            params.top_logprobs = options.top_logprobs;
            params.logit_bias = options.logit_bias.clone();
        }
        params
    }
}
