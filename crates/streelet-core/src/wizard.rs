// ── Provisioning wizard ──
//
// Three-step linear flow for configuring a freshly flashed device:
// pick a group, name the device, see the result. A successful submit
// schedules a one-shot redirect back to the dashboard.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use streelet_api::{ConfigureRequest, DashboardClient};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_REDIRECT_DELAY, DEFAULT_REDIRECT_TARGET, DashboardConfig};
use crate::error::CoreError;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Configuration sent successfully.";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Configuration failed.";
pub const DEFAULT_TRANSPORT_MESSAGE: &str = "Failed to send configuration.";

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum WizardStep {
    #[strum(to_string = "Select group")]
    SelectGroup,
    #[strum(to_string = "Name device")]
    NameDevice,
    #[strum(to_string = "Result")]
    Result,
}

impl WizardStep {
    /// Zero-based position in the flow.
    pub fn index(self) -> u8 {
        match self {
            Self::SelectGroup => 0,
            Self::NameDevice => 1,
            Self::Result => 2,
        }
    }
}

/// The user's input so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardDraft {
    pub group: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardOutcome {
    Succeeded,
    /// `status` is set when the backend answered with a non-2xx code.
    Failed { status: Option<u16> },
}

/// Receives the post-provisioning redirect.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, target: &str) {
        self(target);
    }
}

// ── Redirect timer ───────────────────────────────────────────────────

/// One-shot delayed navigation. Dropping it cancels a redirect that has
/// not fired yet.
struct RedirectTimer {
    cancel: CancellationToken,
    handle: Option<JoinHandle<bool>>,
}

impl RedirectTimer {
    fn schedule(delay: Duration, target: String, navigator: Arc<dyn Navigator>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => false,
                () = tokio::time::sleep(delay) => {
                    debug!(%target, "redirecting after provisioning");
                    navigator.navigate(&target);
                    true
                }
            }
        });
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RedirectTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

// ── Wizard ───────────────────────────────────────────────────────────

/// State machine behind the "add device" flow.
///
/// `SelectGroup -> NameDevice -> Result`, with no way back. Reaching
/// `Result` always happens once a submit has been sent; only the redirect
/// depends on the backend accepting the configuration.
pub struct ProvisioningWizard {
    client: DashboardClient,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    redirect_target: String,
    step: WizardStep,
    draft: WizardDraft,
    loading: bool,
    message: Option<String>,
    outcome: Option<WizardOutcome>,
    redirect: Option<RedirectTimer>,
}

impl ProvisioningWizard {
    pub fn new(client: DashboardClient, navigator: impl Navigator + 'static) -> Self {
        Self {
            client,
            navigator: Arc::new(navigator),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            redirect_target: DEFAULT_REDIRECT_TARGET.into(),
            step: WizardStep::SelectGroup,
            draft: WizardDraft::default(),
            loading: false,
            message: None,
            outcome: None,
            redirect: None,
        }
    }

    /// A wizard using the dashboard, delay and redirect target in `config`.
    pub fn from_config(
        config: &DashboardConfig,
        navigator: impl Navigator + 'static,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(config.client()?, navigator)
            .with_redirect_delay(config.redirect_delay)
            .with_redirect_target(config.redirect_target.clone()))
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn with_redirect_target(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = target.into();
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    /// `true` while a submit is in flight, and after a successful one.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn outcome(&self) -> Option<WizardOutcome> {
        self.outcome
    }

    pub fn redirect_pending(&self) -> bool {
        self.redirect.as_ref().is_some_and(RedirectTimer::is_pending)
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn set_group(&mut self, group: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_editable()?;
        self.draft.group = group.into();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_editable()?;
        self.draft.name = name.into();
        Ok(())
    }

    /// Move from group selection to naming. A blank group is refused and
    /// the step stays where it is.
    pub fn advance(&mut self) -> Result<WizardStep, CoreError> {
        if self.step != WizardStep::SelectGroup {
            return Err(CoreError::validation(format!(
                "cannot advance from step \"{}\"",
                self.step
            )));
        }
        if self.draft.group.trim().is_empty() {
            return Err(CoreError::validation("select a group first"));
        }
        self.step = WizardStep::NameDevice;
        Ok(self.step)
    }

    // ── Submit ───────────────────────────────────────────────────────

    /// Send `{grupo, name}` to `/configure` and move to `Result`.
    ///
    /// Backend and transport failures are not errors here: they land in
    /// [`message`](Self::message) and the returned outcome. `Err` means
    /// the submit was refused before anything was sent.
    pub async fn submit_configuration(&mut self) -> Result<WizardOutcome, CoreError> {
        if self.loading {
            return Err(CoreError::Busy {
                operation: "configuration submit".into(),
            });
        }
        if self.step != WizardStep::NameDevice {
            return Err(CoreError::validation(format!(
                "cannot submit from step \"{}\"",
                self.step
            )));
        }
        if self.draft.name.trim().is_empty() {
            return Err(CoreError::validation("device name must not be empty"));
        }

        self.loading = true;
        let request = ConfigureRequest {
            group: self.draft.group.trim().to_owned(),
            name: self.draft.name.trim().to_owned(),
        };

        let outcome = match self.client.configure(&request).await {
            Ok(message) => {
                info!(group = %request.group, name = %request.name, "device configuration accepted");
                self.message = Some(message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.into()));
                self.redirect = Some(RedirectTimer::schedule(
                    self.redirect_delay,
                    self.redirect_target.clone(),
                    Arc::clone(&self.navigator),
                ));
                WizardOutcome::Succeeded
            }
            Err(streelet_api::Error::Backend { status, message }) => {
                warn!(status, "device configuration rejected");
                self.loading = false;
                self.message = Some(message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.into()));
                WizardOutcome::Failed {
                    status: Some(status),
                }
            }
            Err(e) => {
                warn!(error = %e, "device configuration could not be sent");
                self.loading = false;
                self.message = Some(DEFAULT_TRANSPORT_MESSAGE.into());
                WizardOutcome::Failed { status: None }
            }
        };

        self.step = WizardStep::Result;
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    // ── Redirect control ─────────────────────────────────────────────

    /// Cancel a scheduled redirect. Returns `true` if one was still
    /// pending.
    pub fn cancel_redirect(&mut self) -> bool {
        self.redirect.take().is_some_and(|timer| timer.is_pending())
    }

    /// Wait until the scheduled redirect fires. Returns `true` if the
    /// navigator was called, `false` if nothing was scheduled or the
    /// redirect was cancelled.
    pub async fn wait_for_redirect(&mut self) -> bool {
        let Some(handle) = self.redirect.as_mut().and_then(|t| t.handle.take()) else {
            return false;
        };
        matches!(handle.await, Ok(true))
    }

    fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.step == WizardStep::Result {
            Err(CoreError::validation("the configuration has already been submitted"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use streelet_api::TransportConfig;
    use url::Url;

    fn wizard() -> ProvisioningWizard {
        let client = DashboardClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            &TransportConfig::default(),
        )
        .unwrap();
        ProvisioningWizard::new(client, |_: &str| {})
    }

    #[test]
    fn step_indices() {
        assert_eq!(WizardStep::SelectGroup.index(), 0);
        assert_eq!(WizardStep::NameDevice.index(), 1);
        assert_eq!(WizardStep::Result.index(), 2);
    }

    #[test]
    fn blank_group_does_not_advance() {
        let mut w = wizard();
        w.set_group("   ").unwrap();
        assert!(matches!(w.advance(), Err(CoreError::Validation { .. })));
        assert_eq!(w.step(), WizardStep::SelectGroup);

        w.set_group("g1").unwrap();
        assert_eq!(w.advance().unwrap(), WizardStep::NameDevice);
        assert!(w.advance().is_err());
    }

    #[tokio::test]
    async fn submit_requires_name_step_and_name() {
        let mut w = wizard();
        assert!(matches!(
            w.submit_configuration().await,
            Err(CoreError::Validation { .. })
        ));

        w.set_group("g1").unwrap();
        w.advance().unwrap();
        assert!(matches!(
            w.submit_configuration().await,
            Err(CoreError::Validation { .. })
        ));
        assert_eq!(w.step(), WizardStep::NameDevice);
        assert!(!w.loading());
        assert!(w.message().is_none());
    }

    #[test]
    fn nothing_to_cancel_initially() {
        let mut w = wizard();
        assert!(!w.redirect_pending());
        assert!(!w.cancel_redirect());
    }
}
