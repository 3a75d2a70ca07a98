//! Operations context for dependency injection

use dialoguer::{theme::ColorfulTheme, Confirm};
use flowtidy_config::Config;
use flowtidy_errors::{Error, OpsError};
use flowtidy_events::{AppEvent, EventEmitter, EventMessage, EventMeta, EventSender};
use flowtidy_net::{HealthProbe, HttpHealthProbe};
use flowtidy_platform::{ProcessOperations, TokioProcessOperations};
use std::sync::Arc;
use uuid::Uuid;

/// Operations context providing access to all collaborators
pub struct OpsCtx {
    /// Resolved configuration (file, environment and CLI overrides applied)
    pub config: Config,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Runs the workflow engine CLI
    pub process: Arc<dyn ProcessOperations>,
    /// Probes the engine health endpoint
    pub probe: Arc<dyn HealthProbe>,
    /// Skip confirmation prompts for destructive steps
    pub assume_yes: bool,
    /// Correlates every event emitted during one command run
    pub run_id: Uuid,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }

    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        let meta = meta.with_correlation_id(self.run_id.to_string());
        // A dropped receiver only means nobody is listening any more
        let _ = self.tx.send(EventMessage::new(meta, event));
    }
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Ask before a destructive step
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Aborted` when the user declines, or an internal
    /// error when no terminal is available to ask on.
    pub fn confirm(&self, prompt: &str) -> Result<(), Error> {
        if self.assume_yes {
            return Ok(());
        }

        let accepted = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::internal(format!("Failed to get user confirmation: {e}")))?;

        if accepted {
            Ok(())
        } else {
            Err(OpsError::Aborted.into())
        }
    }
}

/// Builder for operations context
pub struct OpsContextBuilder {
    config: Option<Config>,
    tx: Option<EventSender>,
    process: Option<Arc<dyn ProcessOperations>>,
    probe: Option<Arc<dyn HealthProbe>>,
    assume_yes: bool,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            tx: None,
            process: None,
            probe: None,
            assume_yes: false,
        }
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Replace the process runner (defaults to real subprocesses)
    #[must_use]
    pub fn with_process(mut self, process: Arc<dyn ProcessOperations>) -> Self {
        self.process = Some(process);
        self
    }

    /// Replace the health probe (defaults to HTTP)
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or event sender is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        Ok(OpsCtx {
            config,
            tx,
            process: self
                .process
                .unwrap_or_else(|| Arc::new(TokioProcessOperations::new())),
            probe: self.probe.unwrap_or_else(|| Arc::new(HttpHealthProbe)),
            assume_yes: self.assume_yes,
            run_id: Uuid::new_v4(),
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_event_sender() {
        let result = OpsContextBuilder::new()
            .with_config(Config::default())
            .build();
        assert!(matches!(
            result,
            Err(Error::Ops(OpsError::MissingComponent { ref component })) if component == "event_sender"
        ));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let (tx, _rx) = flowtidy_events::channel();
        let ctx = OpsContextBuilder::new()
            .with_config(Config::default())
            .with_event_sender(tx)
            .with_assume_yes(true)
            .build()
            .unwrap();
        assert!(ctx.confirm("Delete everything?").is_ok());
    }

    #[test]
    fn events_carry_run_id() {
        let (tx, mut rx) = flowtidy_events::channel();
        let ctx = OpsContextBuilder::new()
            .with_config(Config::default())
            .with_event_sender(tx)
            .build()
            .unwrap();

        ctx.emit_warning("first");
        ctx.emit_debug("second");
        let run_id = ctx.run_id.to_string();
        for _ in 0..2 {
            let message = rx.try_recv().unwrap();
            assert_eq!(message.meta.correlation_id.as_deref(), Some(run_id.as_str()));
        }
    }
}
