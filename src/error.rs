use thiserror::Error;

use crate::di::TypeKey;

pub type Result<T> = std::result::Result<T, InjectError>;

/// Boxed error raised by a constructor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("Type is already registered: {type_name}")]
    RegistrationConflict { type_name: String },

    #[error("Type `{target}` must derive from `{type_name}`")]
    RegistrationTypeMismatch { type_name: String, target: String },

    #[error("Cannot construct `{type_name}`: {reason}")]
    NotConstructible {
        type_name: String,
        reason: Unconstructible,
    },

    #[error("Circular dependency detected while resolving `{type_name}`, activating: [{}]", .activating.join(" -> "))]
    CircularDependency {
        type_name: String,
        activating: Vec<String>,
    },

    #[error("Failed to construct `{type_name}`: {source}")]
    ConstructionFailed {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },
}

/// Why a resolve target could not be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unconstructible {
    #[error("type is abstract")]
    Abstract,

    #[error("type has no accessible constructor")]
    NoAccessibleConstructor,

    #[error("type has {count} accessible constructors, expected exactly one")]
    AmbiguousConstructors { count: usize },
}

impl InjectError {
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    pub fn conflict(key: TypeKey) -> Self {
        Self::RegistrationConflict {
            type_name: key.name().to_string(),
        }
    }

    pub fn type_mismatch(key: TypeKey, target: TypeKey) -> Self {
        Self::RegistrationTypeMismatch {
            type_name: key.name().to_string(),
            target: target.name().to_string(),
        }
    }

    pub fn not_constructible(key: TypeKey, reason: Unconstructible) -> Self {
        Self::NotConstructible {
            type_name: key.name().to_string(),
            reason,
        }
    }

    pub fn circular(key: TypeKey, activating: &[TypeKey]) -> Self {
        Self::CircularDependency {
            type_name: key.name().to_string(),
            activating: activating.iter().map(|k| k.name().to_string()).collect(),
        }
    }

    pub fn construction_failed(key: TypeKey, source: impl Into<BoxError>) -> Self {
        Self::ConstructionFailed {
            type_name: key.name().to_string(),
            source: source.into(),
        }
    }

    pub fn downcast_failed(type_name: impl Into<String>) -> Self {
        Self::DowncastFailed {
            type_name: type_name.into(),
        }
    }

    /// Errors raised by `register*` calls for a bad argument or an existing registration.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::RegistrationConflict { .. }
                | Self::RegistrationTypeMismatch { .. }
        )
    }

    /// Errors raised while walking the dependency graph during `resolve`.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::NotConstructible { .. }
                | Self::CircularDependency { .. }
                | Self::ConstructionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_construction_failed_keeps_source() {
        let err = InjectError::construction_failed(TypeKey::of::<u8>(), Boom);
        let source = err.source().expect("source is preserved");
        assert!(source.downcast_ref::<Boom>().is_some());
        assert!(err.is_resolution_failure());
        assert!(!err.is_registration_error());
    }

    #[test]
    fn test_circular_message_lists_stack() {
        let err = InjectError::circular(
            TypeKey::of::<u8>(),
            &[TypeKey::of::<u16>(), TypeKey::of::<u32>()],
        );
        assert_eq!(
            err.to_string(),
            "Circular dependency detected while resolving `u8`, activating: [u16 -> u32]"
        );
    }

    #[test]
    fn test_not_constructible_message() {
        let err = InjectError::not_constructible(
            TypeKey::of::<u8>(),
            Unconstructible::AmbiguousConstructors { count: 2 },
        );
        assert_eq!(
            err.to_string(),
            "Cannot construct `u8`: type has 2 accessible constructors, expected exactly one"
        );
    }

    #[test]
    fn test_registration_errors_are_classified() {
        let err = InjectError::conflict(TypeKey::of::<u8>());
        assert!(err.is_registration_error());
        assert!(!err.is_resolution_failure());
    }
}
