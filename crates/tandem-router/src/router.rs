// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend selection with per-message and global overrides.
//!
//! Precedence: per-message prefix (`/fast `, `/agent `) > `routing.force_backend` > classifier.

use tandem_config::model::RoutingConfig;
use tandem_core::BackendKind;
use tracing::debug;

use crate::classifier::{PromptClassifier, RouterWeights, RoutingDecision};

/// Why a backend was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// A `/fast ` or `/agent ` prefix on the message.
    MessageOverride,
    /// `routing.force_backend` in config.
    ForcedByConfig,
    /// The scoring classifier.
    Classified,
}

/// A routed prompt: the decision plus the text to send.
#[derive(Debug, Clone)]
pub struct Route {
    /// Classifier output, with `backend` replaced when an override applied.
    pub decision: RoutingDecision,
    /// Prompt text with any override prefix removed.
    pub prompt: String,
    pub source: RouteSource,
}

/// Chooses a backend for each prompt.
#[derive(Debug, Clone)]
pub struct BackendRouter {
    classifier: PromptClassifier,
    force_backend: Option<BackendKind>,
}

impl BackendRouter {
    /// Create a router from configuration.
    pub fn new(config: &RoutingConfig) -> Self {
        let weights = RouterWeights {
            long_prompt_words: config.long_prompt_words,
            greeting_max_words: config.greeting_max_words,
            ..RouterWeights::default()
        };
        Self {
            classifier: PromptClassifier::with_weights(weights),
            force_backend: config.force_backend,
        }
    }

    pub fn classifier(&self) -> &PromptClassifier {
        &self.classifier
    }

    /// Route a message.
    ///
    /// Scores are always computed on the text actually sent, so callers can
    /// see how the classifier would have decided even when overridden.
    pub fn route(&self, message: &str) -> Route {
        let (message_override, text) = parse_backend_override(message);
        let mut decision = self.classifier.classify(text);

        let source = if let Some(backend) = message_override {
            decision.backend = backend;
            RouteSource::MessageOverride
        } else if let Some(backend) = self.force_backend {
            decision.backend = backend;
            RouteSource::ForcedByConfig
        } else {
            RouteSource::Classified
        };

        debug!(
            backend = %decision.backend,
            fast = decision.scores.fast,
            agentic = decision.scores.agentic,
            source = ?source,
            "prompt routed"
        );

        Route {
            decision,
            prompt: text.to_string(),
            source,
        }
    }
}

/// Split a leading `/fast ` or `/agent ` override off a message.
pub fn parse_backend_override(text: &str) -> (Option<BackendKind>, &str) {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("/fast ") {
        (Some(BackendKind::Fast), rest)
    } else if let Some(rest) = trimmed.strip_prefix("/agent ") {
        (Some(BackendKind::Agentic), rest)
    } else {
        (None, text)
    }
}
