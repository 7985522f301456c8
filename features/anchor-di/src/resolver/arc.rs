use std::{any::type_name, sync::Arc};

use crate::{
    errors::{InjectError, RequireError},
    resolver::{Dependencies, Resolver},
    types::{DependencyInfo, Injectable, TypeInfo},
};

impl<T: ?Sized + Injectable> Resolver for Arc<T> {
    fn resolve(dependencies: &Dependencies<'_>) -> Result<Self, InjectError> {
        let resolved = dependencies.require(TypeInfo::of::<T>())?;
        let downcasted = resolved
            .downcast::<T>()
            .map_err(|e| RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type: e,
            })?;

        Ok(downcasted)
    }

    fn dependency_info() -> DependencyInfo {
        DependencyInfo {
            type_info: TypeInfo::of::<T>(),
            optional: false,
        }
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(dependencies: &Dependencies<'_>) -> Result<Self, InjectError> {
        match Resolvable::resolve(dependencies) {
            Ok(resolved) => Ok(Some(resolved)),
            Err(e) => match e {
                // Only called once all bound dependencies resolved, so a missing type was never bound
                InjectError::RequireError(RequireError::TypeMissing(_)) => Ok(None),
                _ => Err(e),
            },
        }
    }

    fn dependency_info() -> DependencyInfo {
        let original = Resolvable::dependency_info();
        DependencyInfo {
            optional: true,
            ..original
        }
    }
}
