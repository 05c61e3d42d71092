//! Error types for sections, settings and coercion

use thiserror::Error;

use crate::datatypes::Kind;

/// A raw value could not be converted to a setting's kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value:?} to {kind}: {reason}")]
pub struct ConversionError {
    pub kind: Kind,
    pub value: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(kind: Kind, value: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            kind,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// A `%(name)s` reference in an option value could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("bad interpolation syntax in {value:?}: '%' must be followed by '%' or '(name)s'")]
    BadSyntax { value: String },

    #[error("interpolation references missing option '{name}'")]
    Missing { name: String },

    #[error("interpolation nested deeper than {depth} levels in {value:?}")]
    TooDeep { depth: usize, value: String },
}

/// Errors surfaced by section and store operations.
///
/// Data problems (bad values, missing files or sections) are logged and
/// replaced by defaults where they occur; only misuse reaches the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("'{section}' has no setting '{name}'")]
    UnknownSetting { section: String, name: String },

    #[error("'{section}' setting '{name}' cannot be deleted")]
    ImmutableSetting { section: String, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_message() {
        let err = ConversionError::new(Kind::Integer, "nope", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "cannot convert \"nope\" to integer: invalid digit found in string"
        );
    }

    #[test]
    fn test_immutable_setting_message() {
        let err = ConfigError::ImmutableSetting {
            section: "Server".into(),
            name: "port".into(),
        };
        assert_eq!(err.to_string(), "'Server' setting 'port' cannot be deleted");
    }

    #[test]
    fn test_interpolation_error_messages() {
        let err = InterpolationError::Missing { name: "home".into() };
        assert_eq!(err.to_string(), "interpolation references missing option 'home'");

        let err = InterpolationError::TooDeep {
            depth: 10,
            value: "%(a)s".into(),
        };
        assert_eq!(
            err.to_string(),
            "interpolation nested deeper than 10 levels in \"%(a)s\""
        );
    }

    #[test]
    fn test_conversion_converts_into_config_error() {
        let err: ConfigError = ConversionError::new(Kind::Boolean, "maybe", "bad token").into();
        assert!(matches!(err, ConfigError::Conversion(_)));
    }
}
