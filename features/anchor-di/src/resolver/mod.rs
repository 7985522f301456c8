use std::{any::TypeId, collections::HashMap};

use crate::{
    errors::{InjectError, RequireError},
    types::{DependencyInfo, Instance, TypeInfo},
};

pub mod arc;

/// Allows custom behaviour on injection
///
/// Every constructor parameter type implements this, it both describes the
/// dependency and pulls it from the resolved services on construction.
pub trait Resolver: Sized {
    fn resolve(dependencies: &Dependencies<'_>) -> Result<Self, InjectError>;

    fn dependency_info() -> DependencyInfo;
}

/// Read only view on the resolved services, handed to constructors
pub struct Dependencies<'a> {
    resolved: &'a HashMap<TypeId, Instance>,
}
impl<'a> Dependencies<'a> {
    pub(crate) fn new(resolved: &'a HashMap<TypeId, Instance>) -> Self {
        Self { resolved }
    }

    /// Gets the resolved instance of a service
    pub fn require(&self, info: TypeInfo) -> Result<&'a Instance, RequireError> {
        self.resolved
            .get(&info.type_id)
            .ok_or(RequireError::TypeMissing(info.type_name))
    }

    pub fn resolve<T: Resolver>(&self) -> Result<T, InjectError> {
        T::resolve(self)
    }
}
