//! Input checks for the enrollment form

use crate::error::ValidationError;

pub const CODE_LENGTH: usize = 6;

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("Please enter your name"));
    }
    Ok(())
}

/// Syntactic plausibility only: `local@domain.tld`, no whitespace
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("Please enter your email"));
    }

    let invalid = || ValidationError::new("Please enter a valid email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Keep digits only, at most [`CODE_LENGTH`] of them
pub fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CODE_LENGTH)
        .collect()
}

pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::new("Please enter the code from your email"));
    }
    if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(format!(
            "The code has {} digits",
            CODE_LENGTH
        )));
    }
    Ok(())
}
