//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Mutex;

use streelet_core::Confirm;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Confirmation gate for core operations that keeps a failed prompt's
/// error instead of folding it into a "no".
pub struct PromptGate<F> {
    ask: F,
    failure: Mutex<Option<CliError>>,
}

impl<F> PromptGate<F>
where
    F: Fn(&str) -> Result<bool, CliError>,
{
    pub fn new(ask: F) -> Self {
        Self {
            ask,
            failure: Mutex::new(None),
        }
    }

    /// The error from the last failed prompt, if any.
    pub fn take_failure(&self) -> Option<CliError> {
        self.failure.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl<F> Confirm for PromptGate<F>
where
    F: Fn(&str) -> Result<bool, CliError>,
{
    fn confirm(&self, prompt: &str) -> bool {
        match (self.ask)(prompt) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed");
                if let Ok(mut slot) = self.failure.lock() {
                    *slot = Some(e);
                }
                false
            }
        }
    }
}

/// Refuse to prompt when nobody can answer.
pub fn ensure_interactive(action: &str, yes_flag: bool) -> Result<(), CliError> {
    if yes_flag || std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        })
    }
}

/// Map a dialoguer prompt failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// `"-"` for missing values in table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gate_passes_answers_through() {
        let gate = PromptGate::new(|_: &str| Ok(true));
        assert!(gate.confirm("Delete?"));
        assert!(gate.take_failure().is_none());

        let gate = PromptGate::new(|_: &str| Ok(false));
        assert!(!gate.confirm("Delete?"));
        assert!(gate.take_failure().is_none());
    }

    #[test]
    fn gate_keeps_prompt_failure() {
        let gate = PromptGate::new(|_: &str| {
            Err(CliError::Io(std::io::Error::other("not a terminal")))
        });
        assert!(!gate.confirm("Delete?"));
        let err = gate.take_failure();
        assert!(matches!(err, Some(CliError::Io(_))));
        assert!(gate.take_failure().is_none());
    }
}
