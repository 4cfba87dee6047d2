//! # Inject
//!
//! A minimal dependency injection container.
//!
//! Register abstractions against the types that implement them (or against ready-made
//! instances), then ask for the abstraction. The container picks the single public
//! constructor of the target type, resolves its parameters recursively, detects
//! circular dependencies, and caches one instance per requested type.
//!
//! ## Features
//!
//! - **Constructor injection**: parameters are resolved in declared order
//! - **Singletons**: every requested type is built at most once per container
//! - **Trait objects**: resolve `Arc<dyn Trait>` through declared conversions
//! - **Self-resolution**: concrete types resolve without being registered
//! - **Derive support**: `#[derive(Injectable)]` describes a struct from its `Arc<_>` fields
//!
//! ## Quick Start
//!
//! ```rust
//! use inject::prelude::*;
//!
//! // 1. Declare your abstractions
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//! abstraction!(dyn Logger);
//!
//! // 2. Describe your implementations
//! #[derive(Injectable)]
//! #[injectable(implements(Logger))]
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("{message}");
//!     }
//! }
//!
//! #[derive(Injectable)]
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! // 3. Wire and resolve
//! let container = Container::new();
//! container.register::<dyn Logger, ConsoleLogger>().unwrap();
//!
//! let service = container.resolve::<UserService>().unwrap();
//! service.logger.log("ready");
//!
//! let logger = container.resolve::<dyn Logger>().unwrap();
//! assert!(Arc::ptr_eq(&service.logger, &logger));
//! ```

extern crate self as inject;

pub mod config;
pub mod di;
pub mod error;
pub mod module;

// Re-export core types
pub use config::{ConflictPolicy, ConstructorAccess, ContainerConfig};
pub use di::{
    Arguments, ConstructorInfo, Container, ContainerBuilder, Dependency, Factory, Injectable,
    Instance, TypeCatalog, TypeInfo, TypeInfoBuilder, TypeKey, TypeKind, Visibility,
};
pub use error::{BoxError, InjectError, Result, Unconstructible};
pub use module::Module;

// Re-export macros
pub use inject_macro::Injectable as DeriveInjectable;

/// Prelude module for convenient imports
///
/// ```
/// use inject::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConflictPolicy, ConstructorAccess, ContainerConfig};
    pub use crate::di::{Container, ContainerBuilder, Injectable, Instance, TypeInfo, TypeKey};
    pub use crate::error::{InjectError, Result};
    pub use crate::module::Module;
    pub use crate::{DeriveInjectable as Injectable, abstraction};
    pub use std::sync::Arc;
}
