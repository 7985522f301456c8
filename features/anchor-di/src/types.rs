use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Boxed error returned by fallible constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolved services may be shared across threads once the container is built,
/// so anything injectable needs to be Send + Sync + 'static.
///
/// Also implemented for unsized service contracts such as `dyn Trait`.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Disposal contract for services holding resources
///
/// Invoked by [`ServiceContainer::dispose`](crate::container::ServiceContainer::dispose).
pub trait Disposable {
    fn dispose(&self);
}

/// A constructed service
///
/// Holds an `Arc<S>` for the service type `S`, erased so that instances of
/// different services can share one map.
#[derive(Clone)]
pub struct Instance {
    /// The service contract this instance is bound to
    pub service: TypeInfo,
    /// The concrete type that was constructed
    pub implementation: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<S: ?Sized + Injectable>(implementation: TypeInfo, instance: Arc<S>) -> Self {
        Instance {
            service: TypeInfo::of::<S>(),
            implementation,
            instance: Arc::new(instance),
        }
    }

    /// Returns the shared service, or the name of the actual type on mismatch
    pub fn downcast<S: ?Sized + Injectable>(&self) -> Result<Arc<S>, &'static str> {
        match self.instance.downcast_ref::<Arc<S>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.service.type_name),
        }
    }
}

/// Information about a constructor dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required Type
    pub type_info: TypeInfo,
    /// If it is optional or required
    pub optional: bool,
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
