use std::{cmp::Reverse, sync::Arc};

use crate::{
    errors::{ConfigurationError, InjectError},
    resolver::{Dependencies, Resolver},
    types::{DependencyInfo, DynError, Injectable, TypeInfo},
};

/// A concrete type the container can instantiate
///
/// Lists the constructors the type offers. The container picks one when the
/// type is bound, see [`select_constructor`].
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use anchor_di::{Component, Constructor};
///
/// struct Database { url: String }
/// struct UserRepository { db: Arc<Database> }
///
/// impl Component for UserRepository {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|db: Arc<Database>| UserRepository { db })]
///     }
/// }
/// ```
pub trait Component: Injectable + Sized {
    /// Constructors in declaration order
    ///
    /// An empty list marks the type as not constructible, binding it fails.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Converts a shared implementation into the service contract it is bound to
///
/// Implemented for every type as its own contract. Use [`provides!`](crate::provides)
/// to implement it for trait objects.
pub trait Provides<S: ?Sized + Injectable>: Injectable {
    fn provide(self: Arc<Self>) -> Arc<S>;
}
impl<T: Injectable> Provides<T> for T {
    fn provide(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Provides`] for trait object contracts
///
/// ```rust
/// use anchor_di::provides;
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
///
/// provides!(SystemClock => dyn Clock);
/// ```
#[macro_export]
macro_rules! provides {
    ($implementation:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::Provides<$service> for $implementation {
                fn provide(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

type ConstructFn<T> = Box<dyn Fn(&Dependencies<'_>) -> Result<T, InjectError> + Send + Sync>;

/// One way of constructing `T`, together with the dependencies it needs
pub struct Constructor<T> {
    dependencies: Vec<DependencyInfo>,
    construct: ConstructFn<T>,
}
impl<T: 'static> Constructor<T> {
    /// Constructor from a function whose parameters are all [`Resolver`]s
    pub fn new<Args: 'static, F: ConstructorFn<Args, T>>(f: F) -> Self {
        Constructor {
            dependencies: F::dependencies(),
            construct: Box::new(move |dependencies: &Dependencies<'_>| f.call(dependencies)),
        }
    }

    /// Constructor from a fallible function whose parameters are all [`Resolver`]s
    pub fn try_new<Args: 'static, F: TryConstructorFn<Args, T>>(f: F) -> Self {
        Constructor {
            dependencies: F::dependencies(),
            construct: Box::new(move |dependencies: &Dependencies<'_>| f.try_call(dependencies)),
        }
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.dependencies.len()
    }

    pub fn dependencies(&self) -> &[DependencyInfo] {
        &self.dependencies
    }

    pub(crate) fn construct(&self, dependencies: &Dependencies<'_>) -> Result<T, InjectError> {
        (self.construct)(dependencies)
    }

    /// Maps the constructed value, keeping the dependencies
    pub(crate) fn map<U: 'static>(
        self,
        f: impl Fn(T) -> U + Send + Sync + 'static,
    ) -> Constructor<U> {
        let construct = self.construct;
        Constructor {
            dependencies: self.dependencies,
            construct: Box::new(move |dependencies: &Dependencies<'_>| construct(dependencies).map(&f)),
        }
    }
}

/// Picks the constructor to use for `T`
///
/// The constructor with the most parameters wins, ties go to the one declared
/// first. Fails if `T` declares no constructor at all.
pub fn select_constructor<T: 'static>(
    constructors: Vec<Constructor<T>>,
) -> Result<Constructor<T>, ConfigurationError> {
    constructors
        .into_iter()
        .enumerate()
        .max_by_key(|(index, constructor)| (constructor.arity(), Reverse(*index)))
        .map(|(_, constructor)| constructor)
        .ok_or(ConfigurationError::NotConstructible {
            implementation: TypeInfo::of::<T>(),
        })
}

/// Any function taking only [`Resolver`]s
pub trait ConstructorFn<Args, T>: Send + Sync + 'static {
    fn dependencies() -> Vec<DependencyInfo>;

    fn call(&self, dependencies: &Dependencies<'_>) -> Result<T, InjectError>;
}

/// Any function taking only [`Resolver`]s and returning a `Result`
pub trait TryConstructorFn<Args, T>: Send + Sync + 'static {
    fn dependencies() -> Vec<DependencyInfo>;

    fn try_call(&self, dependencies: &Dependencies<'_>) -> Result<T, InjectError>;
}

macro_rules! impl_constructor_fn {
    ($($arg:ident),*) => {
        impl<Fun, T, $($arg,)*> ConstructorFn<($($arg,)*), T> for Fun
        where
            Fun: Fn($($arg),*) -> T + Send + Sync + 'static,
            $($arg: Resolver,)*
        {
            fn dependencies() -> Vec<DependencyInfo> {
                vec![$($arg::dependency_info()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(&self, dependencies: &Dependencies<'_>) -> Result<T, InjectError> {
                $(let $arg = $arg::resolve(dependencies)?;)*
                Ok(self($($arg),*))
            }
        }

        impl<Fun, T, E, $($arg,)*> TryConstructorFn<($($arg,)*), T> for Fun
        where
            Fun: Fn($($arg),*) -> Result<T, E> + Send + Sync + 'static,
            E: Into<DynError>,
            $($arg: Resolver,)*
        {
            fn dependencies() -> Vec<DependencyInfo> {
                vec![$($arg::dependency_info()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn try_call(&self, dependencies: &Dependencies<'_>) -> Result<T, InjectError> {
                $(let $arg = $arg::resolve(dependencies)?;)*
                self($($arg),*).map_err(|e| InjectError::Other(e.into()))
            }
        }
    };
}

impl_constructor_fn!();
impl_constructor_fn!(A1);
impl_constructor_fn!(A1, A2);
impl_constructor_fn!(A1, A2, A3);
impl_constructor_fn!(A1, A2, A3, A4);
impl_constructor_fn!(A1, A2, A3, A4, A5);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor_fn!(A1, A2, A3, A4, A5, A6, A7, A8);
