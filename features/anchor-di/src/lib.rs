//! Anchor DI resolves every service contract to exactly one instance.
//!
//! The container is used in three steps:
//! 1. Bind service contracts to implementations ([`ServiceContainer::bind`]) or
//!    to ready made instances ([`ServiceContainer::bind_single`]), in any order.
//! 2. Call [`ServiceContainer::force_resolve`] once all bindings are declared.
//!    Bindings whose dependencies were not available when they were bound are
//!    constructed now, after the dependency graph was checked for cycles and
//!    missing services.
//! 3. Retrieve services with [`ServiceContainer::single`].
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use anchor_di::{provides, Component, Constructor, ServiceContainer};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Name(String);
//!
//! struct Polite {
//!     name: Arc<Name>,
//! }
//! impl Greeter for Polite {
//!     fn greet(&self) -> String {
//!         format!("Good day, {}", self.name.0)
//!     }
//! }
//! impl Component for Polite {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|name: Arc<Name>| Polite { name })]
//!     }
//! }
//! provides!(Polite => dyn Greeter);
//!
//! let mut container = ServiceContainer::new();
//! // Polite is bound before its dependency, it resolves during force_resolve
//! container.bind::<dyn Greeter, Polite>().unwrap();
//! container.bind_instance(Name("Ada".to_string())).unwrap();
//! container.force_resolve().unwrap();
//!
//! let greeter = container.single::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Good day, Ada");
//! ```

pub mod constructor;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub(crate) mod initiator;
pub mod resolver;
pub mod types;

pub use constructor::{Component, Constructor, Provides};
pub use container::ServiceContainer;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::{ConfigurationError, ContainerError, InitError, InjectError, RequireError};
pub use resolver::{Dependencies, Resolver};
pub use types::{DependencyInfo, Disposable, DynError, Injectable, Instance, TypeInfo};
