//! Command implementations for the git-webhook CLI.
//!
//! - `apply`: reconcile the selected webhooks
//! - `delete`: delete the selected webhooks if they exist
//! - `validate`: check the selected declarations without contacting a provider

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use webhook_reconciler::{GitWebhookEngine, HookAction, SecretResolver, ValidationError, WebhookSpec};

use crate::config::AppConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// The mutating operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Apply,
    Delete,
}

/// Result of one webhook.
#[derive(Debug)]
pub struct WebhookOutcome {
    pub webhook: String,
    pub result: Result<HookAction, Error>,
}

impl WebhookOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs `operation` for the webhooks named in `names`, one after another.
///
/// A failing webhook does not stop the remaining ones.
pub async fn run(
    config: &AppConfig,
    operation: Operation,
    names: &[String],
) -> Result<Vec<WebhookOutcome>, Error> {
    let selected = config.select(names)?;
    let secrets = config.secrets.resolver()?;
    let timeout = config.timeout();

    let mut outcomes = Vec::with_capacity(selected.len());
    for spec in selected {
        outcomes.push(run_one(spec, secrets.clone(), operation, timeout).await);
    }
    Ok(outcomes)
}

async fn run_one(
    spec: &WebhookSpec,
    secrets: Arc<dyn SecretResolver>,
    operation: Operation,
    timeout: Duration,
) -> WebhookOutcome {
    let webhook = spec.display_name();
    let engine = GitWebhookEngine::new(spec.clone(), secrets);

    let call = async {
        match operation {
            Operation::Apply => engine.reconcile().await,
            Operation::Delete => engine.delete().await,
        }
    };

    let result = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(action)) => {
            info!(webhook = webhook.as_str(), action = %action, "Webhook processed");
            Ok(action)
        }
        Ok(Err(source)) => {
            error!(
                webhook = webhook.as_str(),
                category = ?source.category(),
                error = %source,
                "Webhook failed"
            );
            Err(Error::Reconcile {
                webhook: webhook.clone(),
                source,
            })
        }
        Err(_) => {
            warn!(webhook = webhook.as_str(), "Webhook call timed out");
            Err(Error::Timeout {
                webhook: webhook.clone(),
                seconds: timeout.as_secs(),
            })
        }
    };

    WebhookOutcome { webhook, result }
}

/// Checks one declaration, including its event names, offline.
pub fn validate_spec(spec: &WebhookSpec) -> Result<(), ValidationError> {
    spec.validate()?;
    spec.validate_events()
}

/// Validates the webhooks named in `names`.
pub fn validate(
    config: &AppConfig,
    names: &[String],
) -> Result<Vec<(String, Result<(), ValidationError>)>, Error> {
    Ok(config
        .select(names)?
        .into_iter()
        .map(|spec| (spec.display_name(), validate_spec(spec)))
        .collect())
}
