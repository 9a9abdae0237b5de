// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credit-exhaustion fallback from the agentic backend to the fast backend.
//!
//! Only one failure triggers a fallback: the agentic backend reporting
//! exhausted credits. The fast path never falls back to the agentic one.

use std::time::Duration;

use tandem_core::{AgenticError, BackendKind, DispatchError, FastAdapter, FastError};
use tracing::{info, warn};

/// Prepended to answers produced by the fallback path.
pub const FALLBACK_DISCLOSURE: &str = "Note: the agent service is out of credits right now, \
     so this answer comes from the fast assistant and may be less thorough.\n\n";

/// Whether an agentic failure should be retried on the fast backend.
pub fn should_fall_back(err: &AgenticError) -> bool {
    matches!(err, AgenticError::CreditsExceeded { .. })
}

/// Maps a failure of the fallback call itself.
///
/// Quota on the fast side means both backends are out of capacity; anything
/// else keeps the fast failure's own category.
pub fn fallback_failure(err: FastError) -> DispatchError {
    match err {
        FastError::QuotaExceeded { .. } => DispatchError::BothExhausted,
        other => other.into(),
    }
}

/// Adds the disclosure note to a fallback answer.
pub fn disclose(text: &str) -> String {
    format!("{FALLBACK_DISCLOSURE}{text}")
}

/// Re-dispatches `prompt` to the fast backend after agentic credit exhaustion.
pub async fn run_fallback(
    fast: &dyn FastAdapter,
    prompt: &str,
    timeout: Duration,
) -> Result<String, DispatchError> {
    info!(
        from = %BackendKind::Agentic,
        to = %BackendKind::Agentic.other(),
        "agentic credits exhausted; falling back"
    );
    match fast.submit(prompt, timeout).await {
        Ok(text) => Ok(disclose(&text)),
        Err(err) => {
            warn!(error = %err, "fallback to fast backend failed");
            Err(fallback_failure(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::ErrorKind;

    #[test]
    fn only_credits_trigger_fallback() {
        assert!(should_fall_back(&AgenticError::CreditsExceeded {
            detail: "402".into()
        }));
        assert!(!should_fall_back(&AgenticError::TaskFailed {
            reason: "x".into()
        }));
        assert!(!should_fall_back(&AgenticError::NotConfigured));
        assert!(!should_fall_back(&AgenticError::CreateFailed {
            detail: "500".into()
        }));
    }

    #[test]
    fn fast_quota_during_fallback_is_both_exhausted() {
        let err = fallback_failure(FastError::QuotaExceeded {
            detail: "429".into(),
        });
        assert_eq!(err.kind(), ErrorKind::BothExhausted);
    }

    #[test]
    fn other_fast_failures_keep_their_category() {
        let err = fallback_failure(FastError::KeyRevoked {
            detail: "API_KEY_INVALID".into(),
        });
        assert_eq!(err.kind(), ErrorKind::RevokedCredential);
        let err = fallback_failure(FastError::NotConfigured);
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn disclosure_is_a_prefix() {
        let text = disclose("answer");
        assert!(text.starts_with(FALLBACK_DISCLOSURE));
        assert!(text.ends_with("answer"));
    }
}
