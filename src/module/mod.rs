use crate::di::Container;
use crate::error::Result;

/// Trait for groups of registrations
///
/// A module wires a related set of abstractions in one place. Install it with
/// [`Container::install`] or [`ContainerBuilder::module`](crate::ContainerBuilder::module).
///
/// # Example
/// ```
/// use inject::{abstraction, Container, DeriveInjectable, Module, Result};
///
/// trait UserRepository: Send + Sync {}
/// abstraction!(dyn UserRepository);
///
/// #[derive(DeriveInjectable)]
/// #[injectable(implements(UserRepository))]
/// struct SqlUserRepository;
/// impl UserRepository for SqlUserRepository {}
///
/// struct UserModule;
///
/// impl Module for UserModule {
///     fn register(container: &Container) -> Result<()> {
///         container.register::<dyn UserRepository, SqlUserRepository>()
///     }
/// }
///
/// let container = Container::new();
/// container.install::<UserModule>().unwrap();
/// assert!(container.resolve::<dyn UserRepository>().is_ok());
/// ```
pub trait Module {
    /// Register all bindings and instances of this module
    fn register(container: &Container) -> Result<()>;
}
