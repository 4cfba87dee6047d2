use std::sync::Arc;

use crate::config::ContainerConfig;
use crate::di::{Container, Injectable};
use crate::error::Result;
use crate::module::Module;

/// Builder for constructing a dependency injection container
///
/// Registration errors surface at the call that caused them, so chains use `?`.
///
/// # Example
/// ```
/// use inject::{abstraction, Container, ContainerConfig, DeriveInjectable};
/// use std::sync::Arc;
///
/// trait Database: Send + Sync {}
/// abstraction!(dyn Database);
///
/// #[derive(DeriveInjectable)]
/// #[injectable(implements(Database))]
/// struct PostgresDatabase;
/// impl Database for PostgresDatabase {}
///
/// # fn main() -> inject::Result<()> {
/// let container = Container::builder()
///     .config(ContainerConfig::from_env())
///     .bind::<dyn Database, PostgresDatabase>()?
///     .build();
/// let _database = container.resolve::<dyn Database>()?;
/// # Ok(())
/// # }
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Replace the configuration, keeping everything registered so far.
    ///
    /// Earlier registrations were checked under the previous conflict policy.
    pub fn config(self, config: ContainerConfig) -> Self {
        Self {
            container: self.container.reconfigure(config),
        }
    }

    /// Describe a type without registering it
    pub fn describe<T: Injectable + ?Sized>(self) -> Result<Self> {
        self.container.describe::<T>()?;
        Ok(self)
    }

    /// Bind an abstraction to the type built for it
    pub fn bind<K, T>(self) -> Result<Self>
    where
        K: Injectable + ?Sized,
        T: Injectable + ?Sized,
    {
        self.container.register::<K, T>()?;
        Ok(self)
    }

    /// Register a service instance
    pub fn instance<K: Injectable + ?Sized>(self, value: Arc<K>) -> Result<Self> {
        self.container.register_value(value)?;
        Ok(self)
    }

    /// Apply a module's registrations
    pub fn module<M: Module>(self) -> Result<Self> {
        self.container.install::<M>()?;
        Ok(self)
    }

    /// Build the container
    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConflictPolicy;
    use crate::{DeriveInjectable, InjectError};

    #[derive(DeriveInjectable)]
    struct Clock;

    #[test]
    fn test_builder_registers_instance() {
        let clock = Arc::new(Clock);
        let container = ContainerBuilder::new()
            .instance(clock.clone())
            .unwrap()
            .build();
        assert!(Arc::ptr_eq(&clock, &container.resolve::<Clock>().unwrap()));
    }

    #[test]
    fn test_builder_reports_conflicts() {
        let result = ContainerBuilder::new()
            .bind::<Clock, Clock>()
            .and_then(|builder| builder.bind::<Clock, Clock>());
        assert!(matches!(
            result.err(),
            Some(InjectError::RegistrationConflict { .. })
        ));
    }

    #[test]
    fn test_builder_applies_config() {
        let config = ContainerConfig::new().with_conflict_policy(ConflictPolicy::PerTable);
        let container = ContainerBuilder::new().config(config).build();
        assert_eq!(container.config().conflict_policy, ConflictPolicy::PerTable);
    }

    #[test]
    fn test_config_keeps_earlier_bindings() {
        let clock = Arc::new(Clock);
        let config = ContainerConfig::new().with_conflict_policy(ConflictPolicy::PerTable);
        let container = ContainerBuilder::new()
            .instance(clock.clone())
            .unwrap()
            .config(config)
            .build();

        assert!(container.contains::<Clock>());
        assert_eq!(container.config().conflict_policy, ConflictPolicy::PerTable);
        assert!(Arc::ptr_eq(&clock, &container.resolve::<Clock>().unwrap()));
    }
}
