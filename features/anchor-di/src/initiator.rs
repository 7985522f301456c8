use std::{any::TypeId, collections::HashMap, sync::Arc};

use crate::{
    constructor::{select_constructor, Component, Constructor, Provides},
    container::ServiceEntry,
    dependency_graph::{DependencyGraphError, DependencyGraphErrors},
    errors::{ConfigurationError, InitError},
    resolver::Dependencies,
    types::{DependencyInfo, Injectable, Instance, TypeInfo},
};

/// A deferred construction of a bound service
///
/// Nothing is constructed until every dependency is resolved.
pub(crate) struct ConstructionRequest {
    pub service: TypeInfo,
    pub implementation: TypeInfo,
    constructor: Constructor<Instance>,
}
impl ConstructionRequest {
    /// Selects the constructor `I` provides `S` with
    pub fn new<S, I>() -> Result<Self, ConfigurationError>
    where
        S: ?Sized + Injectable,
        I: Component + Provides<S>,
    {
        let implementation = TypeInfo::of::<I>();
        let constructor = select_constructor(I::constructors())?.map(move |built: I| {
            let service = <I as Provides<S>>::provide(Arc::new(built));
            Instance::new(implementation, service)
        });

        Ok(ConstructionRequest {
            service: TypeInfo::of::<S>(),
            implementation,
            constructor,
        })
    }

    pub fn dependencies(&self) -> &[DependencyInfo] {
        self.constructor.dependencies()
    }
}

/// Result of trying to resolve a single binding
pub(crate) enum Outcome {
    Resolved(Instance),
    Pending(ConstructionRequest),
}

/// When a resolution attempt happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// While bindings are still being declared, an unbound type may be bound later
    Binding,
    /// During `force_resolve`, everything that will ever be bound is bound
    Sweep,
}

/// Resolves bindings against a snapshot of the container
///
/// Only reads the container's maps, the container applies the outcomes.
pub(crate) struct ServiceInitiator<'a> {
    resolved: &'a HashMap<TypeId, Instance>,
    bound: &'a HashMap<TypeId, ServiceEntry>,
}
impl<'a> ServiceInitiator<'a> {
    pub fn new(
        resolved: &'a HashMap<TypeId, Instance>,
        bound: &'a HashMap<TypeId, ServiceEntry>,
    ) -> Self {
        Self { resolved, bound }
    }

    /// Constructs the request if all of its dependencies are available
    pub fn try_resolve(
        &self,
        request: ConstructionRequest,
        phase: Phase,
    ) -> Result<Outcome, InitError> {
        if !self.is_ready(&request, phase) {
            return Ok(Outcome::Pending(request));
        }

        self.construct(&request).map(Outcome::Resolved)
    }

    /// Sweeps over all pending requests once
    ///
    /// Returns the instances of every request which could be constructed
    pub fn sweep(
        &self,
        pending: &HashMap<TypeId, ConstructionRequest>,
    ) -> Result<Vec<Instance>, InitError> {
        let mut staged = Vec::new();
        for request in pending.values() {
            if !self.is_ready(request, Phase::Sweep) {
                tracing::trace!("'{}' is still waiting for dependencies", request.service);
                continue;
            }

            staged.push(self.construct(request)?);
        }

        Ok(staged)
    }

    /// Lists every dependency that kept a pending request from resolving
    pub fn unsatisfied(
        &self,
        pending: &HashMap<TypeId, ConstructionRequest>,
    ) -> DependencyGraphErrors {
        let errors = pending
            .values()
            .flat_map(|request| {
                request
                    .dependencies()
                    .iter()
                    .filter(|dependency| !self.is_satisfied(dependency, Phase::Sweep))
                    .map(|dependency| DependencyGraphError::MissingDependency {
                        dependency: dependency.type_info,
                        required_by: request.service,
                    })
            })
            .collect();

        DependencyGraphErrors { errors }
    }

    fn is_ready(&self, request: &ConstructionRequest, phase: Phase) -> bool {
        request
            .dependencies()
            .iter()
            .all(|dependency| self.is_satisfied(dependency, phase))
    }

    fn is_satisfied(&self, dependency: &DependencyInfo, phase: Phase) -> bool {
        let type_id = dependency.type_info.type_id;
        if self.resolved.contains_key(&type_id) {
            return true;
        }

        // An optional dependency which is never bound gets injected as None
        phase == Phase::Sweep && dependency.optional && !self.bound.contains_key(&type_id)
    }

    fn construct(&self, request: &ConstructionRequest) -> Result<Instance, InitError> {
        let instance = request
            .constructor
            .construct(&Dependencies::new(self.resolved))
            .map_err(|error| InitError::ConstructionFailed {
                service: request.service,
                error: Arc::new(error),
            })?;

        tracing::debug!(
            "Constructed '{}' as '{}'",
            request.service,
            request.implementation
        );
        Ok(instance)
    }
}
