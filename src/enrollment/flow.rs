//! Tier enrollment: plan selection → contact details → one-time code → activation.
//!
//! The session is published through a `watch` channel so a view can render
//! `submitting` and `error` while a request is in flight. Resetting starts a new
//! run; a response belonging to an earlier run is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::validation::{sanitize_code, validate_code, validate_email, validate_name};
use crate::core::tier::{TierReader, TierWriter};
use crate::error::{EnrollmentError, ValidationError, VerificationError};
use crate::metrics::Metrics;
use crate::models::{SignupRequest, Tier, VerifyRequest};
use crate::services::api::DashboardApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrollmentStep {
    #[default]
    Select,
    Details,
    Verify,
    Done,
}

impl EnrollmentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStep::Select => "SELECT",
            EnrollmentStep::Details => "DETAILS",
            EnrollmentStep::Verify => "VERIFY",
            EnrollmentStep::Done => "DONE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSession {
    pub step: EnrollmentStep,
    pub chosen_tier: Tier,
    pub contact_name: String,
    pub contact_email: String,
    pub code: String,
    pub submitting: bool,
    pub error: Option<String>,
    /// Tier granted by the server once DONE
    pub activated_tier: Option<Tier>,
}

impl Default for EnrollmentSession {
    fn default() -> Self {
        Self {
            step: EnrollmentStep::Select,
            chosen_tier: Tier::Pro,
            contact_name: String::new(),
            contact_email: String::new(),
            code: String::new(),
            submitting: false,
            error: None,
            activated_tier: None,
        }
    }
}

pub struct EnrollmentFlow {
    api: Arc<dyn DashboardApi>,
    tier: TierWriter,
    session: watch::Sender<EnrollmentSession>,
    run: AtomicU64,
    metrics: Option<Arc<Metrics>>,
}

impl EnrollmentFlow {
    /// Takes ownership of the only tier writer
    pub fn new(api: Arc<dyn DashboardApi>, tier: TierWriter) -> Self {
        let (session, _) = watch::channel(EnrollmentSession::default());
        Self {
            api,
            tier,
            session,
            run: AtomicU64::new(0),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.record_tier(self.tier.current());
        self.metrics = Some(metrics);
        self
    }

    pub fn session(&self) -> EnrollmentSession {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EnrollmentSession> {
        self.session.subscribe()
    }

    pub fn step(&self) -> EnrollmentStep {
        self.session.borrow().step
    }

    pub fn active_tier(&self) -> Tier {
        self.tier.current()
    }

    pub fn tier_reader(&self) -> TierReader {
        self.tier.reader()
    }

    /// Back to SELECT with every captured field cleared
    pub fn reset(&self) {
        self.session.send_modify(|session| {
            self.run.fetch_add(1, Ordering::SeqCst);
            *session = EnrollmentSession::default();
        });
    }

    pub fn open(&self) {
        self.reset();
    }

    pub fn dismiss(&self) {
        self.reset();
    }

    pub fn choose_tier(&self, tier: Tier) -> Result<(), EnrollmentError> {
        self.expect_step(EnrollmentStep::Select)?;
        if !tier.is_paid() {
            let err = ValidationError::new("Choose PRO or ELITE to enroll");
            self.set_error(err.message());
            return Err(err.into());
        }
        self.session.send_modify(|session| {
            session.chosen_tier = tier;
            session.step = EnrollmentStep::Details;
            session.error = None;
        });
        Ok(())
    }

    pub fn set_name(&self, name: &str) -> Result<(), EnrollmentError> {
        self.expect_step(EnrollmentStep::Details)?;
        self.session
            .send_modify(|session| session.contact_name = name.to_string());
        Ok(())
    }

    pub fn set_email(&self, email: &str) -> Result<(), EnrollmentError> {
        self.expect_step(EnrollmentStep::Details)?;
        self.session
            .send_modify(|session| session.contact_email = email.to_string());
        Ok(())
    }

    /// Typed code input: non-digits are dropped and the value capped at six digits
    pub fn input_code(&self, input: &str) -> Result<(), EnrollmentError> {
        self.expect_step(EnrollmentStep::Verify)?;
        let code = sanitize_code(input);
        self.session.send_modify(|session| session.code = code);
        Ok(())
    }

    pub async fn submit_details(&self) -> Result<(), EnrollmentError> {
        let session = self.session();
        if session.step != EnrollmentStep::Details {
            return Err(EnrollmentError::InvalidStep(session.step.as_str()));
        }
        if let Err(err) = validate_name(&session.contact_name)
            .and_then(|_| validate_email(&session.contact_email))
        {
            self.set_error(err.message());
            return Err(err.into());
        }

        let run = self.begin_submit(EnrollmentStep::Details)?;
        let request = SignupRequest {
            name: session.contact_name.trim().to_string(),
            email: session.contact_email.trim().to_string(),
            plan: session.chosen_tier,
        };

        match self.api.beta_signup(&request).await {
            Ok(response) => {
                info!(
                    plan = %request.plan,
                    already_registered = response.already_registered,
                    "Enrollment: signup accepted, awaiting code"
                );
                self.finish(run, |session| {
                    session.submitting = false;
                    session.error = None;
                    session.code.clear();
                    session.step = EnrollmentStep::Verify;
                })
            }
            Err(e) => {
                let err = VerificationError::from(e);
                warn!(error = %err, "Enrollment: signup failed");
                let message = err.user_message();
                self.finish(run, |session| {
                    session.submitting = false;
                    session.error = Some(message);
                })?;
                Err(err.into())
            }
        }
    }

    /// Verify the code; on success the server-granted tier becomes active
    pub async fn submit_code(&self) -> Result<Tier, EnrollmentError> {
        let session = self.session();
        if session.step != EnrollmentStep::Verify {
            return Err(EnrollmentError::InvalidStep(session.step.as_str()));
        }
        if let Err(err) = validate_code(&session.code) {
            self.set_error(err.message());
            return Err(err.into());
        }

        let run = self.begin_submit(EnrollmentStep::Verify)?;
        let request = VerifyRequest {
            email: session.contact_email.trim().to_string(),
            code: session.code.clone(),
        };

        match self.api.beta_verify(&request).await {
            Ok(response) => {
                let granted = response.plan;
                self.finish(run, |session| {
                    session.submitting = false;
                    session.error = None;
                    session.activated_tier = Some(granted);
                    session.step = EnrollmentStep::Done;
                })?;
                self.tier.activate(granted);
                if let Some(metrics) = &self.metrics {
                    metrics.record_tier(granted);
                }
                info!(
                    chosen = %session.chosen_tier,
                    granted = %granted,
                    "Enrollment: tier {} activated",
                    granted
                );
                Ok(granted)
            }
            Err(e) => {
                let err = VerificationError::from(e);
                warn!(error = %err, "Enrollment: verification failed");
                let message = err.user_message();
                self.finish(run, |session| {
                    session.submitting = false;
                    session.error = Some(message);
                })?;
                Err(err.into())
            }
        }
    }

    fn expect_step(&self, expected: EnrollmentStep) -> Result<(), EnrollmentError> {
        let current = self.step();
        if current != expected {
            return Err(EnrollmentError::InvalidStep(current.as_str()));
        }
        Ok(())
    }

    fn set_error(&self, message: &str) {
        self.session
            .send_modify(|session| session.error = Some(message.to_string()));
    }

    /// Mark the session as submitting; returns the run the request belongs to
    fn begin_submit(&self, expected: EnrollmentStep) -> Result<u64, EnrollmentError> {
        let mut outcome = Err(EnrollmentError::InvalidStep(expected.as_str()));
        self.session.send_if_modified(|session| {
            if session.step != expected {
                outcome = Err(EnrollmentError::InvalidStep(session.step.as_str()));
                return false;
            }
            if session.submitting {
                outcome = Err(EnrollmentError::AlreadySubmitting);
                return false;
            }
            session.submitting = true;
            session.error = None;
            outcome = Ok(self.run.load(Ordering::SeqCst));
            true
        });
        outcome
    }

    /// Apply a response unless the flow was reset while it was in flight
    fn finish<F>(&self, run: u64, apply: F) -> Result<(), EnrollmentError>
    where
        F: FnOnce(&mut EnrollmentSession),
    {
        let mut current_run = true;
        self.session.send_if_modified(|session| {
            if self.run.load(Ordering::SeqCst) != run {
                current_run = false;
                return false;
            }
            apply(session);
            true
        });
        if current_run {
            Ok(())
        } else {
            Err(EnrollmentError::Cancelled)
        }
    }
}
