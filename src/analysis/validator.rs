use crate::core::error::{Error, Result};

/// Token content check: non-empty, letters and digits only.
///
/// Applied to every token supplied for indexing. Query literals are not
/// validated here; the query path passes any literal through to the store as
/// an equality value.
pub fn is_valid(content: &str) -> bool {
    !content.is_empty() && content.chars().all(char::is_alphanumeric)
}

/// Validates a full submission: at least one token, every token valid.
pub fn validate_tokens(tokens: &[String]) -> Result<()> {
    if tokens.is_empty() {
        return Err(Error::validation("a document needs at least one token"));
    }

    for token in tokens {
        if !is_valid(token) {
            return Err(Error::validation(format!(
                "the value '{}' is not alphanumerical",
                token
            )));
        }
    }

    Ok(())
}
