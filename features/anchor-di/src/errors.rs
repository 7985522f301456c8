use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphErrors,
    types::{DynError, TypeInfo},
};

/// Any error raised by the container while binding or resolving
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Require(#[from] RequireError),
    #[error(transparent)]
    Init(#[from] InitError),
}

/// A binding was declared that can never be satisfied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The implementation declares no constructor, it can't be instantiated
    #[error("'{implementation}' declares no constructor and can't be instantiated")]
    NotConstructible { implementation: TypeInfo },
    /// Bindings are frozen once resolution has started
    #[error("Can't bind '{service}' - the container has already been resolved")]
    Sealed { service: TypeInfo },
}

/// Errors when trying to require a certain type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// The required type was never bound
    #[error("Service '{0}' is not registered.")]
    TypeMissing(&'static str),
    /// The required type is bound, but still waiting for its dependencies
    #[error("Service '{0}' is not registered - it is bound but not resolved yet, did you call `force_resolve`?")]
    TypeUnresolved(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors while a constructor gathers its arguments
#[derive(Error, Debug)]
pub enum InjectError {
    /// Could not require the type
    #[error(transparent)]
    RequireError(#[from] RequireError),
    /// Generic error during Injection
    #[error("Error during injection: {0}")]
    Other(DynError),
}

/// Errors while resolving bindings
#[derive(Error, Debug, Clone)]
pub enum InitError {
    /// There are issues with the dependency graph
    #[error(transparent)]
    DependencyGraph(#[from] DependencyGraphErrors),

    /// A constructor failed to build
    #[error("Constructing '{service}' failed - error: {error}")]
    ConstructionFailed {
        service: TypeInfo,
        error: Arc<InjectError>,
    },
}
