//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod run;
pub mod validate;
pub mod version;

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::CeremonyError;
use crate::observability::EndReason;

/// Process-wide stop request, carrying the reason of the first trigger.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    reason: Arc<OnceLock<EndReason>>,
}

impl Shutdown {
    /// Creates an untriggered shutdown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Only the first reason is kept.
    pub fn trigger(&self, reason: EndReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is requested.
    pub async fn wait(&self) -> EndReason {
        self.token.cancelled().await;
        self.reason.get().copied().unwrap_or(EndReason::Interrupted)
    }
}

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, shutdown: Shutdown) -> Result<(), CeremonyError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, shutdown).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
