//! Multi-step tier enrollment ending in one-time-code verification.

pub mod flow;
pub mod validation;

pub use flow::{EnrollmentFlow, EnrollmentSession, EnrollmentStep};
pub use validation::{sanitize_code, validate_code, validate_email, validate_name, CODE_LENGTH};
