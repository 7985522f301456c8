use anchor_di::TypeInfo;

/// Errors when registering or retrieving configs
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The required Config is not known
    #[error("The required Config type '{0}' is not known")]
    ConfigMissing(TypeInfo),
    /// The Config is already registered
    #[error("The Config type '{0}' is already registered")]
    ConfigAlreadyRegistered(TypeInfo),
}
