use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use anchor_di::TypeInfo;

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type. Bind the provider
/// into the [`ServiceContainer`](anchor_di::ServiceContainer) so components can
/// receive configs through [`Config`](crate::config::Config).
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, (TypeInfo, Arc<dyn Any + Send + Sync + 'static>)>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn initialize() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `None` if the config type is not registered
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|(_, entry)| entry.clone().downcast().ok())
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return a [`ConfigError`]
    pub fn require_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config()
            .ok_or(ConfigError::ConfigMissing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a [`ConfigError`]
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();

        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::ConfigAlreadyRegistered(info));
        }

        tracing::debug!("Registered config '{}'", info);
        self.configs.insert(info.type_id, (info, Arc::new(config)));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Names of all registered configs
    pub fn registered(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.configs.values().map(|(info, _)| *info)
    }
}
