//! Domain constants
//!
//! Centralized location for the completion-budget tables: the global
//! fallback, per-provider defaults, and the per-family output ceilings the
//! safety pass enforces. The tables are keyed by [`ProviderKind`]; model-name
//! fragments appear only inside a provider's own table and are matched
//! longest-fragment-first.

use crate::types::ProviderKind;

/// Global fallback completion budget when neither the model descriptor nor
/// the provider table supplies one.
pub const GLOBAL_MAX_COMPLETION_TOKENS: u32 = 4_096;

/// Hard safety ceiling applied to the global fallback.
pub const HARD_COMPLETION_CEILING: u32 = 32_768;

/// Cross-provider generic output ceiling for unknown providers.
pub const GENERIC_COMPLETION_CEILING: u32 = 8_192;

/// The single temperature value reasoning-class providers accept.
pub const REASONING_FIXED_TEMPERATURE: f32 = 1.0;

/// Per-family output ceilings for OpenAI models.
///
/// Rows are `(name fragment, ceiling)`; the longest fragment contained in
/// the model identifier wins.
pub const OPENAI_FAMILY_CEILINGS: &[(&str, u32)] = &[
    ("gpt-3.5", 4_096),
    ("gpt-4-turbo", 4_096),
    ("gpt-4.1", 32_768),
    ("gpt-4o-mini", 16_384),
    ("gpt-4o", 16_384),
    ("gpt-4", 8_192),
    ("gpt-5", 128_000),
    ("o1-mini", 65_536),
    ("o1", 100_000),
    ("o3-mini", 100_000),
    ("o3", 100_000),
    ("o4-mini", 100_000),
];

/// Per-family output ceilings for Anthropic models.
pub const ANTHROPIC_FAMILY_CEILINGS: &[(&str, u32)] = &[
    ("claude-3-opus", 4_096),
    ("claude-3-haiku", 4_096),
    ("claude-3-5-sonnet", 8_192),
    ("claude-3-5-haiku", 8_192),
    ("claude-3-7-sonnet", 64_000),
    ("claude-sonnet-4", 64_000),
    ("claude-opus-4", 32_000),
];

/// Per-family output ceilings for Google models.
pub const GOOGLE_FAMILY_CEILINGS: &[(&str, u32)] = &[
    ("gemini-1.5-flash", 8_192),
    ("gemini-1.5-pro", 8_192),
    ("gemini-2.0-flash", 8_192),
    ("gemini-2.5-flash", 65_536),
    ("gemini-2.5-pro", 65_536),
];

/// Per-family output ceilings for Mistral models.
pub const MISTRAL_FAMILY_CEILINGS: &[(&str, u32)] = &[
    ("mistral-large", 8_192),
    ("mistral-small", 8_192),
    ("codestral", 8_192),
];

/// Default completion budget per provider, used when the model descriptor
/// carries no explicit maximum.
pub fn provider_default_completion_tokens(provider: ProviderKind) -> Option<u32> {
    match provider {
        ProviderKind::OpenAi => Some(16_384),
        ProviderKind::Anthropic => Some(8_192),
        ProviderKind::Google => Some(8_192),
        ProviderKind::Mistral => Some(8_192),
        ProviderKind::Other => None,
    }
}

/// Family ceiling table for a provider.
pub fn family_ceilings(provider: ProviderKind) -> &'static [(&'static str, u32)] {
    match provider {
        ProviderKind::OpenAi => OPENAI_FAMILY_CEILINGS,
        ProviderKind::Anthropic => ANTHROPIC_FAMILY_CEILINGS,
        ProviderKind::Google => GOOGLE_FAMILY_CEILINGS,
        ProviderKind::Mistral => MISTRAL_FAMILY_CEILINGS,
        ProviderKind::Other => &[],
    }
}

/// Generic ceiling for models of a provider that match no family fragment.
pub fn provider_generic_ceiling(provider: ProviderKind) -> u32 {
    match provider {
        ProviderKind::OpenAi => 32_768,
        ProviderKind::Anthropic => 32_000,
        ProviderKind::Google => 65_536,
        ProviderKind::Mistral => 8_192,
        ProviderKind::Other => GENERIC_COMPLETION_CEILING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_never_exceed_generic_ceiling() {
        for provider in [
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
            ProviderKind::Google,
            ProviderKind::Mistral,
            ProviderKind::Other,
        ] {
            if let Some(default) = provider_default_completion_tokens(provider) {
                assert!(
                    default <= provider_generic_ceiling(provider),
                    "default for {provider} would be clipped by its own generic ceiling"
                );
            }
        }
    }

    #[test]
    fn unknown_provider_has_no_family_rows() {
        assert!(family_ceilings(ProviderKind::Other).is_empty());
    }

    #[test]
    fn global_fallback_is_under_hard_ceiling() {
        assert!(GLOBAL_MAX_COMPLETION_TOKENS <= HARD_COMPLETION_CEILING);
    }
}
