use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use crate::{
    constructor::{Component, Provides},
    dependency_graph::DependencyGraph,
    errors::{ConfigurationError, ContainerError, InitError, RequireError},
    initiator::{ConstructionRequest, Outcome, Phase, ServiceInitiator},
    types::{DependencyInfo, Disposable, Injectable, Instance, TypeInfo},
};

/// Record of a binding, kept whether it is resolved or not
pub(crate) struct ServiceEntry {
    pub service: TypeInfo,
    pub implementation: TypeInfo,
    pub dependencies: Vec<DependencyInfo>,
}

/// A binding taken out of the container's maps
struct RemovedBinding {
    entry: ServiceEntry,
    resolved: Option<Instance>,
    pending: Option<ConstructionRequest>,
}

/// Container mapping service contracts to their single instance
///
/// Bind everything first, then call [`ServiceContainer::force_resolve`] once.
/// Afterwards services can be retrieved with [`ServiceContainer::single`].
///
/// All mutation goes through `&mut self`, so binding and resolving happen
/// on one thread during startup. Once resolved the container can be shared.
#[derive(Default)]
pub struct ServiceContainer {
    /// Instances constructed with all of their dependencies
    resolved: HashMap<TypeId, Instance>,
    /// Bindings waiting for their dependencies
    pending: HashMap<TypeId, ConstructionRequest>,
    /// Every binding, resolved or pending
    all_services: HashMap<TypeId, ServiceEntry>,
    /// Set once `force_resolve` started, no bindings are accepted afterwards
    sealed: bool,
}
impl Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("ServiceContainer");
        let mut entries: Vec<_> = self.all_services.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.service.type_name);
        for (type_id, entry) in entries {
            let val = if self.resolved.contains_key(type_id) {
                "resolved"
            } else {
                "pending"
            };
            map.field(entry.service.type_name, &val);
        }
        map.finish()
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }
}

// Binding
impl ServiceContainer {
    /// Binds the service contract `S` to the implementation `I`
    ///
    /// `I` is constructed right away if all of its dependencies are already
    /// resolved, otherwise construction is deferred to [`ServiceContainer::force_resolve`].
    /// Binding `S` again replaces the previous binding.
    pub fn bind<S, I>(&mut self) -> Result<&mut Self, ContainerError>
    where
        S: ?Sized + Injectable,
        I: Component + Provides<S>,
    {
        let service = TypeInfo::of::<S>();
        self.ensure_open(service)?;

        let request = ConstructionRequest::new::<S, I>()?;
        let entry = ServiceEntry {
            service,
            implementation: request.implementation,
            dependencies: request.dependencies().to_vec(),
        };

        // Unbind first so the new implementation is never built from the instance it replaces
        let previous = self.unbind(service.type_id);
        let attempt = ServiceInitiator::new(&self.resolved, &self.all_services)
            .try_resolve(request, Phase::Binding);
        let outcome = match attempt {
            Ok(outcome) => outcome,
            Err(e) => {
                self.restore(service.type_id, previous);
                return Err(e.into());
            }
        };
        match outcome {
            Outcome::Resolved(instance) => {
                tracing::debug!("Bound '{}' to '{}' - resolved", service, entry.implementation);
                self.resolved.insert(service.type_id, instance);
            }
            Outcome::Pending(request) => {
                tracing::debug!("Bound '{}' to '{}' - pending", service, entry.implementation);
                self.pending.insert(service.type_id, request);
            }
        }
        self.all_services.insert(service.type_id, entry);

        Ok(self)
    }

    /// Binds `I` as its own service contract
    pub fn bind_self<I: Component>(&mut self) -> Result<&mut Self, ContainerError> {
        self.bind::<I, I>()
    }

    /// Binds an already constructed instance as resolved
    ///
    /// The instance is not inspected for dependencies.
    pub fn bind_single<S: ?Sized + Injectable>(
        &mut self,
        instance: Arc<S>,
    ) -> Result<&mut Self, ConfigurationError> {
        let service = TypeInfo::of::<S>();
        self.ensure_open(service)?;

        tracing::debug!("Bound instance of '{}'", service);
        self.unbind(service.type_id);
        self.resolved
            .insert(service.type_id, Instance::new(service, instance));
        self.all_services.insert(
            service.type_id,
            ServiceEntry {
                service,
                implementation: service,
                dependencies: Vec::new(),
            },
        );

        Ok(self)
    }

    /// Binds a value as its own service contract
    pub fn bind_instance<T: Injectable>(
        &mut self,
        instance: T,
    ) -> Result<&mut Self, ConfigurationError> {
        self.bind_single(Arc::new(instance))
    }

    fn ensure_open(&self, service: TypeInfo) -> Result<(), ConfigurationError> {
        if self.sealed {
            tracing::error!("Tried to bind '{}' after the container was resolved", service);
            return Err(ConfigurationError::Sealed { service });
        }
        Ok(())
    }

    /// Removes the binding from every map, returning what was removed
    fn unbind(&mut self, type_id: TypeId) -> Option<RemovedBinding> {
        let entry = self.all_services.remove(&type_id)?;
        tracing::debug!(
            "Removing binding of '{}' to '{}'",
            entry.service,
            entry.implementation
        );

        Some(RemovedBinding {
            entry,
            resolved: self.resolved.remove(&type_id),
            pending: self.pending.remove(&type_id),
        })
    }

    /// Puts back a binding removed by a failed rebind
    fn restore(&mut self, type_id: TypeId, removed: Option<RemovedBinding>) {
        let Some(RemovedBinding {
            entry,
            resolved,
            pending,
        }) = removed
        else {
            return;
        };

        tracing::debug!("Restoring binding of '{}' to '{}'", entry.service, entry.implementation);
        if let Some(instance) = resolved {
            self.resolved.insert(type_id, instance);
        }
        if let Some(request) = pending {
            self.pending.insert(type_id, request);
        }
        self.all_services.insert(type_id, entry);
    }
}

// Resolution
impl ServiceContainer {
    /// Resolves all pending bindings
    ///
    /// Fails without promoting anything if the bindings contain a circular
    /// dependency or depend on a service which is never bound.
    /// Seals the container, later bind calls fail.
    pub fn force_resolve(&mut self) -> Result<(), InitError> {
        self.sealed = true;

        let graph = self.dependency_graph();
        if let Err(errors) = graph.check() {
            tracing::error!("{errors}");
            return Err(errors.into());
        }

        tracing::debug!(
            "Resolving {} pending of {} bound services",
            self.pending.len(),
            self.all_services.len()
        );

        let mut sweeps = 0;
        while !self.pending.is_empty() {
            sweeps += 1;
            let initiator = ServiceInitiator::new(&self.resolved, &self.all_services);
            let staged = initiator.sweep(&self.pending)?;

            if staged.is_empty() {
                let errors = initiator.unsatisfied(&self.pending);
                tracing::error!("Sweep {sweeps} made no progress: {errors}");
                return Err(errors.into());
            }

            for instance in staged {
                let type_id = instance.service.type_id;
                self.pending.remove(&type_id);
                if self.resolved.contains_key(&type_id) {
                    continue;
                }
                self.resolved.insert(type_id, instance);
            }

            tracing::debug!(
                "Sweep {sweeps} complete [{} pending]",
                self.pending.len()
            );
        }

        tracing::debug!("All {} services resolved", self.resolved.len());
        Ok(())
    }

    /// Snapshot of the dependency graph of every bound service
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::new(
            self.all_services
                .values()
                .map(|entry| (entry.service, entry.dependencies.as_slice())),
        )
    }
}

// Retrieval
impl ServiceContainer {
    /// Gets the resolved instance of `S`
    ///
    /// Never resolves anything itself
    pub fn single<S: ?Sized + Injectable>(&self) -> Result<Arc<S>, RequireError> {
        self.resolved_instance::<S>()?
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: type_name::<S>(),
                actual_type,
            })
    }

    /// Disposes the resolved instance of `S` and removes its binding
    pub fn dispose<S: ?Sized + Injectable + Disposable>(&mut self) -> Result<(), RequireError> {
        let instance = self.single::<S>()?;
        self.unbind(TypeId::of::<S>());

        tracing::debug!("Disposing '{}'", type_name::<S>());
        instance.dispose();
        Ok(())
    }

    pub fn is_bound<S: ?Sized + Injectable>(&self) -> bool {
        self.all_services.contains_key(&TypeId::of::<S>())
    }

    pub fn is_resolved<S: ?Sized + Injectable>(&self) -> bool {
        self.resolved.contains_key(&TypeId::of::<S>())
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn resolved_instance<S: ?Sized + Injectable>(&self) -> Result<&Instance, RequireError> {
        let type_id = TypeId::of::<S>();
        if let Some(instance) = self.resolved.get(&type_id) {
            return Ok(instance);
        }

        if self.pending.contains_key(&type_id) {
            return Err(RequireError::TypeUnresolved(type_name::<S>()));
        }
        Err(RequireError::TypeMissing(type_name::<S>()))
    }
}
