//! Form surfaces and the submission controller
//!
//! A surface is one rendered instance of the lead form, either embedded in
//! the hero section (`Inline`) or shown as an overlay (`Popup`). Both share
//! the same controller:
//!
//! ```text
//! Idle --submit--> Validating --invalid--> Error
//!                             --valid----> Submitting --ok---> Success
//!                                                     --fail-> Error
//! Error --submit--> Validating
//! ```
//!
//! On success a one-shot redirect to the thank-you page is scheduled. Closing
//! or destroying the surface starts a new session: results and timers that
//! belong to the old session are dropped without touching state.

use crate::config::Config;
use crate::gateway::{SubmissionError, SubmissionGateway};
use crate::models::{FieldError, LeadFormState, SubmissionStatus};
use crate::navigation::{Navigator, Route};
use crate::utm::{self, NavigationContext};
use crate::validator::{self, ValidationResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Embedded in the hero section, mounted for the page's lifetime
    Inline,
    /// Overlay opened and dismissed by the visitor
    Popup,
}

impl SurfaceKind {
    /// Text of the submit control for `status`
    pub fn submit_label(&self, status: &SubmissionStatus) -> &'static str {
        match (self, status) {
            (_, SubmissionStatus::Submitting) => "Sending...",
            (SurfaceKind::Inline, SubmissionStatus::Success) => "Sent Successfully!",
            (SurfaceKind::Inline, _) => "Get Free Audit Now",
            (SurfaceKind::Popup, SubmissionStatus::Success) => "Done!",
            (SurfaceKind::Popup, SubmissionStatus::Error(_)) => "Error - Retry",
            (SurfaceKind::Popup, SubmissionStatus::Idle) => "SUBMIT",
        }
    }

    /// Message shown under the submit control, if any
    pub fn acknowledgement(&self, status: &SubmissionStatus) -> Option<String> {
        match (self, status) {
            (SurfaceKind::Inline, SubmissionStatus::Error(msg)) => {
                Some(format!("Submission failed: {}. Please try again.", msg))
            }
            (SurfaceKind::Popup, SubmissionStatus::Success) => {
                Some("We'll contact you shortly!".to_string())
            }
            (SurfaceKind::Popup, SubmissionStatus::Error(_)) => {
                Some("Something went wrong. Please try again.".to_string())
            }
            _ => None,
        }
    }
}

/// Controller phases, journaled in order of entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ready for input
    Idle,
    /// Checking field values, no I/O
    Validating,
    /// Waiting on the gateway
    Submitting,
    /// Lead delivered, redirect pending
    Success,
    /// Validation or delivery failed; resubmit allowed
    Error,
}

/// Result of one `Surface::submit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered; the redirect is scheduled
    Submitted,
    /// Refused locally, nothing was sent; carries every invalid field
    Rejected(ValidationResult),
    /// The gateway reported a failure; resubmitting is allowed
    Failed(SubmissionError),
    /// A submission is already in flight, possibly one started before the
    /// popup was last closed
    Busy,
    /// This surface already delivered its lead
    AlreadySubmitted,
    /// The surface went away while the request was in flight
    Discarded,
    /// The surface is closed or destroyed
    Inactive,
}

/// Per-surface behaviour taken from configuration
#[derive(Debug, Clone)]
pub struct SurfaceSettings {
    /// Fallback for `utm_source` when the query string has none
    pub default_utm_source: String,
    /// Delay between the success acknowledgement and the redirect
    pub redirect_delay: Duration,
    /// Destination of the redirect, basename included
    pub thank_you_href: String,
}

impl SurfaceSettings {
    /// Derive settings from the `[form]` and `[router]` sections
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            default_utm_source: cfg.form.default_utm_source.clone(),
            redirect_delay: cfg.form.redirect_delay(),
            thank_you_href: Route::ThankYou.href(&cfg.router.basename),
        }
    }
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// External capabilities a surface talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Where leads are delivered
    pub gateway: Arc<dyn SubmissionGateway>,
    /// Routing layer receiving the thank-you redirect
    pub navigator: Arc<dyn Navigator>,
    /// Page location read for UTM attribution
    pub location: Arc<dyn NavigationContext>,
}

struct SurfaceInner {
    form: LeadFormState,
    status: SubmissionStatus,
    phases: Vec<Phase>,
    open: bool,
    destroyed: bool,
    /// Bumped whenever the surface closes or is destroyed
    session: u64,
    /// A gateway call is outstanding, whichever session started it
    in_flight: bool,
    redirect: Option<JoinHandle<()>>,
}

impl SurfaceInner {
    fn enter(&mut self, kind: SurfaceKind, phase: Phase) {
        tracing::debug!("[{:?}] -> {:?}", kind, phase);
        self.phases.push(phase);
    }

    fn end_session(&mut self) {
        self.session += 1;
        if let Some(handle) = self.redirect.take() {
            handle.abort();
        }
    }

    fn is_current(&self, session: u64) -> bool {
        !self.destroyed && self.session == session
    }
}

impl Drop for SurfaceInner {
    fn drop(&mut self) {
        if let Some(handle) = self.redirect.take() {
            handle.abort();
        }
    }
}

fn lock(inner: &Mutex<SurfaceInner>) -> MutexGuard<'_, SurfaceInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to one form surface. Clones share the same surface; separate
/// `Surface::new` calls never share state.
#[derive(Clone)]
pub struct Surface {
    kind: SurfaceKind,
    settings: Arc<SurfaceSettings>,
    deps: Collaborators,
    inner: Arc<Mutex<SurfaceInner>>,
}

impl Surface {
    /// Create a surface. Inline surfaces mount right away; popups start
    /// closed and capture attribution on `open`.
    pub fn new(kind: SurfaceKind, settings: SurfaceSettings, deps: Collaborators) -> Self {
        let surface = Self {
            kind,
            settings: Arc::new(settings),
            deps,
            inner: Arc::new(Mutex::new(SurfaceInner {
                form: LeadFormState::new(),
                status: SubmissionStatus::Idle,
                phases: Vec::new(),
                open: false,
                destroyed: false,
                session: 0,
                in_flight: false,
                redirect: None,
            })),
        };

        if kind == SurfaceKind::Inline {
            surface.activate();
        }
        surface
    }

    fn activate(&self) {
        let utm = utm::capture_utm(
            self.deps.location.as_ref(),
            &self.settings.default_utm_source,
        );
        let mut inner = lock(&self.inner);
        inner.form.set_utm(utm);
        inner.status = SubmissionStatus::Idle;
        inner.open = true;
        inner.enter(self.kind, Phase::Idle);
    }

    /// Show a popup. Resets the status and recaptures attribution; field
    /// values from an earlier opening are kept.
    pub fn open(&self) {
        {
            let inner = lock(&self.inner);
            if inner.destroyed {
                tracing::warn!("[{:?}] open() on a destroyed surface", self.kind);
                return;
            }
            if inner.open {
                return;
            }
        }
        self.activate();
    }

    /// Dismiss a popup
    pub fn close(&self) {
        if self.kind != SurfaceKind::Popup {
            tracing::debug!("[{:?}] close() ignored, only popups close", self.kind);
            return;
        }
        let mut inner = lock(&self.inner);
        if inner.open {
            inner.open = false;
            inner.end_session();
        }
    }

    /// Unmount the surface; nothing in flight may touch it afterwards
    pub fn destroy(&self) {
        let mut inner = lock(&self.inner);
        inner.destroyed = true;
        inner.open = false;
        inner.end_session();
    }

    /// Inline or popup
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Whether the surface is currently shown
    pub fn is_open(&self) -> bool {
        lock(&self.inner).open
    }

    /// Snapshot of the current field values
    pub fn form(&self) -> LeadFormState {
        lock(&self.inner).form.clone()
    }

    /// Status driving the submit control and acknowledgement
    pub fn status(&self) -> SubmissionStatus {
        lock(&self.inner).status.clone()
    }

    /// Every phase entered so far, oldest first
    pub fn phases(&self) -> Vec<Phase> {
        lock(&self.inner).phases.clone()
    }

    /// The submit control is disabled while a request is in flight
    pub fn submit_enabled(&self) -> bool {
        let inner = lock(&self.inner);
        inner.open && !inner.in_flight
    }

    /// Text of the submit control
    pub fn submit_label(&self) -> &'static str {
        self.kind.submit_label(&lock(&self.inner).status)
    }

    /// Message shown under the submit control, if any
    pub fn acknowledgement(&self) -> Option<String> {
        self.kind.acknowledgement(&lock(&self.inner).status)
    }

    /// Edit field values. Returns false, changing nothing, once the surface
    /// is destroyed.
    pub fn edit(&self, f: impl FnOnce(&mut LeadFormState)) -> bool {
        let mut inner = lock(&self.inner);
        if inner.destroyed {
            return false;
        }
        f(&mut inner.form);
        true
    }

    /// Apply a raw input change keyed by the input's name
    pub fn set_field(&self, input_name: &str, value: &str) -> Result<(), FieldError> {
        let mut inner = lock(&self.inner);
        if inner.destroyed {
            return Err(FieldError::SurfaceDestroyed);
        }
        inner.form.set_field(input_name, value)
    }

    /// Run one submission attempt
    pub async fn submit(&self) -> SubmitOutcome {
        let (session, payload) = {
            let mut inner = lock(&self.inner);
            if inner.destroyed || !inner.open {
                return SubmitOutcome::Inactive;
            }
            if inner.in_flight {
                return SubmitOutcome::Busy;
            }
            if inner.status == SubmissionStatus::Success {
                return SubmitOutcome::AlreadySubmitted;
            }

            inner.status = SubmissionStatus::Idle;
            inner.enter(self.kind, Phase::Validating);

            let verdict = validator::validate(&inner.form);
            if let Some(message) = verdict.message() {
                tracing::info!("[{:?}] {}", self.kind, message);
                inner.status = SubmissionStatus::Error(message);
                inner.enter(self.kind, Phase::Error);
                return SubmitOutcome::Rejected(verdict);
            }

            inner.status = SubmissionStatus::Submitting;
            inner.in_flight = true;
            inner.enter(self.kind, Phase::Submitting);
            (inner.session, inner.form.to_payload())
        };

        tracing::info!(
            "[{:?}] Submitting lead via {}...",
            self.kind,
            self.deps.gateway.name()
        );
        let result = self.deps.gateway.submit(&payload).await;

        let mut inner = lock(&self.inner);
        inner.in_flight = false;
        if !inner.is_current(session) {
            tracing::debug!("[{:?}] Surface gone, discarding submission result", self.kind);
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                tracing::info!("[{:?}] Lead submitted", self.kind);
                inner.status = SubmissionStatus::Success;
                inner.enter(self.kind, Phase::Success);
                inner.redirect = Some(self.schedule_redirect(session));
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::warn!("[{:?}] Submission failed: {}", self.kind, e);
                inner.status = SubmissionStatus::Error(e.to_string());
                inner.enter(self.kind, Phase::Error);
                SubmitOutcome::Failed(e)
            }
        }
    }

    fn schedule_redirect(&self, session: u64) -> JoinHandle<()> {
        let weak: Weak<Mutex<SurfaceInner>> = Arc::downgrade(&self.inner);
        let navigator = Arc::clone(&self.deps.navigator);
        let href = self.settings.thank_you_href.clone();
        let delay = self.settings.redirect_delay;
        let kind = self.kind;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut inner = lock(&inner);
                if !inner.is_current(session) {
                    return;
                }
                // Detach our own handle so closing below does not abort us
                inner.redirect = None;
                if kind == SurfaceKind::Popup {
                    inner.open = false;
                    inner.end_session();
                }
            }

            tracing::info!("[{:?}] Redirecting to {}", kind, href);
            navigator.navigate(&href);
        })
    }
}
