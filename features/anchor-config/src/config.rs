use std::{any::type_name, ops::Deref, sync::Arc};

use anchor_di::{
    errors::{InjectError, RequireError},
    resolver::{Dependencies, Resolver},
    types::DependencyInfo,
};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry,
/// and inject them in a constructor as a dependency. The [`ConfigProvider`]
/// has to be bound in the container.
///
/// # Example
/// ```rust
/// use anchor_config::{Config, ConfigProvider};
/// use anchor_di::{Component, Constructor, ServiceContainer};
///
/// struct ServerConfig {
///     port: u16,
/// }
///
/// struct Server {
///     port: u16,
/// }
/// impl Component for Server {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|config: Config<ServerConfig>| Server { port: config.port })]
///     }
/// }
///
/// let mut provider = ConfigProvider::initialize();
/// provider.add_config(ServerConfig { port: 8080 }).unwrap();
///
/// let mut container = ServiceContainer::new();
/// container.bind_self::<Server>().unwrap();
/// container.bind_instance(provider).unwrap();
/// container.force_resolve().unwrap();
///
/// assert_eq!(container.single::<Server>().unwrap().port, 8080);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Resolver for Config<T> {
    fn resolve(dependencies: &Dependencies<'_>) -> Result<Self, InjectError> {
        let config_provider = dependencies.resolve::<Arc<ConfigProvider>>()?;

        let config = config_provider
            .get_config::<T>()
            .ok_or(RequireError::TypeMissing(type_name::<T>()))?;

        Ok(Config { inner: config })
    }

    fn dependency_info() -> DependencyInfo {
        // Configs are read from the provider, so the provider is the dependency
        <Arc<ConfigProvider>>::dependency_info()
    }
}
