//! Booking request intake.
//!
//! A submission passes through a fixed pipeline; the first stage that fails
//! decides the outcome:
//!
//! ```text
//! received
//!   → rate limit        (RateLimited)
//!   → JSON parse        (Malformed)
//!   → schema validation (Invalid, per-field messages)
//!   → spam filter       (Spam)
//!   → sink delivery     (Failed)
//!   → Accepted
//! ```
//!
//! Every request counts against the rate limit, including ones that later
//! fail validation. Accepted forms are handed to a [`ContactSink`]; the
//! default [`TracingSink`] only logs them.

pub mod form;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ContactConfig;
pub use form::{ContactForm, FieldErrors, SpamFilter};
pub use rate_limit::RateLimiter;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Destination for accepted booking requests.
pub trait ContactSink: Send + Sync {
    fn deliver(&self, form: &ContactForm) -> Result<(), SinkError>;
}

/// Logs accepted submissions and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ContactSink for TracingSink {
    fn deliver(&self, form: &ContactForm) -> Result<(), SinkError> {
        info!(
            name = %form.name,
            email = %form.email,
            body_area = %form.body_area,
            size = %form.size,
            reference = form.reference.as_deref().unwrap_or("-"),
            "booking request received"
        );
        Ok(())
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted(ContactForm),
    RateLimited,
    Malformed,
    Invalid(FieldErrors),
    Spam,
    Failed,
}

pub struct ContactService {
    limiter: RateLimiter,
    spam: SpamFilter,
    sink: Arc<dyn ContactSink>,
}

impl ContactService {
    pub fn new(limiter: RateLimiter, spam: SpamFilter, sink: Arc<dyn ContactSink>) -> Self {
        Self {
            limiter,
            spam,
            sink,
        }
    }

    pub fn from_config(config: &ContactConfig, sink: Arc<dyn ContactSink>) -> Self {
        Self::new(
            RateLimiter::new(config.limit, config.window()),
            SpamFilter::new(&config.spam_keywords),
            sink,
        )
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run a raw request body from client `key` through the pipeline.
    pub fn submit(&self, key: &str, body: &[u8]) -> Submission {
        self.submit_at(key, body, Instant::now())
    }

    pub fn submit_at(&self, key: &str, body: &[u8], now: Instant) -> Submission {
        if !self.limiter.check_at(key, now) {
            warn!(client = key, "contact rate limit exceeded");
            return Submission::RateLimited;
        }

        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                warn!(client = key, error = %e, "contact body is not valid JSON");
                return Submission::Malformed;
            }
        };

        let form = match form::validate(&value) {
            Ok(f) => f,
            Err(errors) => return Submission::Invalid(errors),
        };

        if self.spam.is_spam(&form) {
            info!(client = key, "contact submission rejected as spam");
            return Submission::Spam;
        }

        match self.sink.deliver(&form) {
            Ok(()) => Submission::Accepted(form),
            Err(e) => {
                warn!(client = key, error = %e, "contact delivery failed");
                Submission::Failed
            }
        }
    }
}
