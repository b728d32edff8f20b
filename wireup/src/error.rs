use crate::instance::ErrorPtr;
use thiserror::Error;

/// Errors related to resolving and building up instances.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("Cannot inject field '{field}' of '{owner}': no registration or provider exists for '{dependency}'")]
    DependencyMissing {
        owner: &'static str,
        field: &'static str,
        dependency: &'static str,
    },
    #[error("No registration or provider exists for: {0}")]
    NoProvider(&'static str),
    #[error("Multiple providers exist for '{requested}' without a primary marker: {candidates:?}")]
    AmbiguousProvider {
        requested: &'static str,
        candidates: Vec<&'static str>,
    },
    #[error("Multiple primary providers exist for '{requested}': {candidates:?}")]
    DuplicatePrimaryProvider {
        requested: &'static str,
        candidates: Vec<&'static str>,
    },
    #[error("Detected dependency cycle while constructing: {0}")]
    DependencyCycle(&'static str),
    #[error("Error constructing '{type_name}': {error}")]
    ConstructionFailed {
        type_name: &'static str,
        error: ErrorPtr,
    },
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(&'static str),
}

impl ResolutionError {
    /// Checks if this error means no provider was found for the requested type itself, as opposed
    /// to a failure somewhere deeper in its dependency graph.
    #[inline]
    pub fn is_no_provider(&self) -> bool {
        matches!(self, Self::NoProvider(_))
    }
}

impl PartialEq for ResolutionError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::DependencyMissing {
                    owner,
                    field,
                    dependency,
                },
                Self::DependencyMissing {
                    owner: other_owner,
                    field: other_field,
                    dependency: other_dependency,
                },
            ) => owner == other_owner && field == other_field && dependency == other_dependency,
            (Self::NoProvider(lhs), Self::NoProvider(rhs)) => lhs == rhs,
            (
                Self::AmbiguousProvider {
                    requested,
                    candidates,
                },
                Self::AmbiguousProvider {
                    requested: other_requested,
                    candidates: other_candidates,
                },
            ) => requested == other_requested && candidates == other_candidates,
            (
                Self::DuplicatePrimaryProvider {
                    requested,
                    candidates,
                },
                Self::DuplicatePrimaryProvider {
                    requested: other_requested,
                    candidates: other_candidates,
                },
            ) => requested == other_requested && candidates == other_candidates,
            (Self::DependencyCycle(lhs), Self::DependencyCycle(rhs)) => lhs == rhs,
            // error sources are opaque, so only the failing type is compared
            (
                Self::ConstructionFailed { type_name, .. },
                Self::ConstructionFailed {
                    type_name: other_type_name,
                    ..
                },
            ) => type_name == other_type_name,
            (Self::IncompatibleInstance(lhs), Self::IncompatibleInstance(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}
