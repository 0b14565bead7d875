//! Conversion failures

use thiserror::Error;

/// Prefix shown in front of every failure rendered for a user.
pub const FAILURE_PREFIX: &str = "Oops! Something went wrong";

/// Reasons a single conversion can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Identifier is neither a known currency pair nor a registry unit
    #[error("'{0}' is not defined in the unit registry")]
    UnknownUnit(String),

    /// Both units parse but measure different things
    #[error("Cannot convert from '{from}' ({from_dim}) to '{to}' ({to_dim})")]
    IncompatibleUnits {
        from: String,
        from_dim: String,
        to: String,
        to_dim: String,
    },

    /// Value or unit expression cannot be interpreted
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl ConversionError {
    /// Renders the error the way the interactive form shows it.
    pub fn user_message(&self) -> String {
        format!("{FAILURE_PREFIX}: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_embeds_underlying_error() {
        let err = ConversionError::UnknownUnit("XYZ".to_string());
        assert_eq!(
            err.user_message(),
            "Oops! Something went wrong: 'XYZ' is not defined in the unit registry"
        );
    }

    #[test]
    fn test_incompatible_units_message() {
        let err = ConversionError::IncompatibleUnits {
            from: "meter".to_string(),
            from_dim: "[length]".to_string(),
            to: "kilogram".to_string(),
            to_dim: "[mass]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot convert from 'meter' ([length]) to 'kilogram' ([mass])"
        );
    }
}
