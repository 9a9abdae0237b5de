// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt routing for the Tandem dispatcher.
//!
//! - [`PromptClassifier`]: pure, rule-based scoring of a prompt for each backend
//! - [`BackendRouter`]: applies message and config overrides on top of the classifier

pub mod classifier;
pub mod router;

pub use classifier::{PromptClassifier, RouterWeights, RoutingDecision, ScorePair};
pub use router::{parse_backend_override, BackendRouter, Route, RouteSource};
