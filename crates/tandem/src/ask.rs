// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tandem ask`: dispatch one prompt from the terminal.

use tandem_config::TandemConfig;

use crate::CliError;
use crate::serve::build_dispatcher;

pub async fn run_ask(config: TandemConfig, prompt: &str) -> Result<(), CliError> {
    crate::init_tracing(&config.service.log_level);
    let dispatcher = build_dispatcher(&config)?;

    let outcome = dispatcher.dispatch(prompt).await?;
    eprintln!(
        "[{} | confidence {:.1}{}]",
        outcome.backend,
        outcome.decision.confidence,
        if outcome.fell_back { " | fallback" } else { "" }
    );
    println!("{}", outcome.text);
    Ok(())
}
