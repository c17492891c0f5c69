use crate::utils::error::{MslError, Result};

/// Reject empty or whitespace-only identifiers.
pub fn validate_identifier(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MslError::InvalidArgument(format!("Undefined {}", what)));
    }
    Ok(())
}

/// Reject empty strings; whitespace is kept verbatim.
pub fn validate_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(MslError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}
