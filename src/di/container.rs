use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ConflictPolicy, ContainerConfig};
use crate::di::{ContainerBuilder, Dependency, Injectable, Instance, TypeCatalog, TypeInfo, TypeKey};
use crate::error::{InjectError, Result, Unconstructible};
use crate::module::Module;

/// Type mappings and instances, guarded together by the container's lock.
#[derive(Default)]
struct Registry {
    types: HashMap<TypeKey, TypeKey>,
    instances: HashMap<TypeKey, Instance>,
}

thread_local! {
    /// Addresses of the containers whose registry lock this thread holds.
    static HELD: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Registry lock that records itself in [`HELD`] until dropped.
struct RegistryGuard<'a> {
    guard: MutexGuard<'a, Registry>,
    id: usize,
}

impl Deref for RegistryGuard<'_> {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        &self.guard
    }
}

impl DerefMut for RegistryGuard<'_> {
    fn deref_mut(&mut self) -> &mut Registry {
        &mut self.guard
    }
}

impl Drop for RegistryGuard<'_> {
    fn drop(&mut self) {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            if let Some(pos) = held.iter().rposition(|&id| id == self.id) {
                held.remove(pos);
            }
        });
    }
}

/// Thread-safe dependency injection container.
///
/// Maps requested types to the types that should be built for them, and caches one
/// instance per requested type. Unregistered concrete types resolve to themselves.
///
/// Registration and resolution each hold a single lock for their whole duration, so the
/// first resolution of a key produces exactly one instance even under contention.
/// Constructors run under that lock and must not call back into the same container.
///
/// # Panics
/// Any method called on a container from inside one of its own constructors panics
/// instead of deadlocking.
pub struct Container {
    catalog: TypeCatalog,
    registry: Mutex<Registry>,
    config: ContainerConfig,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            catalog: TypeCatalog::new(),
            registry: Mutex::new(Registry::default()),
            config,
        }
    }

    /// Swap the configuration without dropping registrations or cached instances.
    pub(crate) fn reconfigure(self, config: ContainerConfig) -> Self {
        Self { config, ..self }
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Make `T` known to the container without registering it.
    pub fn describe<T: Injectable + ?Sized>(&self) -> Result<Arc<TypeInfo>> {
        self.catalog.describe(Dependency::of::<T>())
    }

    /// Map `key` to `target`, which is built when `key` is resolved.
    ///
    /// # Errors
    /// - `InvalidArgument` if either type is not described.
    /// - `RegistrationConflict` if `key` is already registered.
    /// - `RegistrationTypeMismatch` if `target` does not conform to `key`.
    pub fn register_type(&self, key: TypeKey, target: TypeKey) -> Result<()> {
        self.require_described("key", key)?;
        self.require_described("resolve_type", target)?;

        let mut registry = self.lock();
        let taken = match self.config.conflict_policy {
            ConflictPolicy::Unified => {
                registry.types.contains_key(&key) || registry.instances.contains_key(&key)
            }
            ConflictPolicy::PerTable => registry.types.contains_key(&key),
        };
        if taken {
            return Err(InjectError::conflict(key));
        }

        if !self.catalog.is_assignable(target, key) {
            return Err(InjectError::type_mismatch(key, target));
        }

        tracing::debug!(key = %key, target = %target, "Registered type");
        registry.types.insert(key, target);
        Ok(())
    }

    /// Register a pre-built instance for `key`.
    ///
    /// The instance is converted to `key` up front, so every later `resolve` of `key`
    /// returns this exact object.
    pub fn register_instance(&self, key: TypeKey, instance: Instance) -> Result<()> {
        self.require_described("key", key)?;
        if instance.key() != key {
            self.require_described("instance", instance.key())?;
        }

        let mut registry = self.lock();
        let taken = match self.config.conflict_policy {
            ConflictPolicy::Unified => {
                registry.instances.contains_key(&key) || registry.types.contains_key(&key)
            }
            ConflictPolicy::PerTable => registry.instances.contains_key(&key),
        };
        if taken {
            return Err(InjectError::conflict(key));
        }

        let converted = self
            .catalog
            .convert(&instance, key)
            .ok_or_else(|| InjectError::type_mismatch(key, instance.key()))?;

        tracing::debug!(key = %key, instance = instance.type_name(), "Registered instance");
        registry.instances.insert(key, converted);
        Ok(())
    }

    /// Resolve `key` to its singleton instance, building it and its dependencies on
    /// first use.
    pub fn resolve_key(&self, key: TypeKey) -> Result<Instance> {
        let mut registry = self.lock();
        if !registry.instances.contains_key(&key) {
            self.require_described("key", key)?;
        }
        let mut activating = Vec::new();
        self.resolve_with(&mut registry, key, &mut activating)
    }

    /// Register `T` as the type to build when `K` is requested.
    pub fn register<K, T>(&self) -> Result<()>
    where
        K: Injectable + ?Sized,
        T: Injectable + ?Sized,
    {
        self.describe::<K>()?;
        self.describe::<T>()?;
        self.register_type(TypeKey::of::<K>(), TypeKey::of::<T>())
    }

    /// Register `value` as the instance returned for `K`.
    pub fn register_value<K: Injectable + ?Sized>(&self, value: Arc<K>) -> Result<()> {
        self.describe::<K>()?;
        self.register_instance(TypeKey::of::<K>(), Instance::new(value))
    }

    pub fn resolve<K: Injectable + ?Sized>(&self) -> Result<Arc<K>> {
        self.describe::<K>()?;
        self.resolve_key(TypeKey::of::<K>())?
            .downcast::<K>()
            .ok_or_else(|| InjectError::downcast_failed(std::any::type_name::<K>()))
    }

    /// Run a module's registrations against this container.
    pub fn install<M: Module>(&self) -> Result<&Self> {
        M::register(self)?;
        Ok(self)
    }

    pub fn is_registered(&self, key: TypeKey) -> bool {
        let registry = self.lock();
        registry.types.contains_key(&key) || registry.instances.contains_key(&key)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered(TypeKey::of::<T>())
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().instances.is_empty()
    }

    fn lock(&self) -> RegistryGuard<'_> {
        let id = self as *const Self as usize;
        if HELD.with(|held| held.borrow().contains(&id)) {
            panic!("container re-entered from a constructor it is running");
        }
        let guard = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        HELD.with(|held| held.borrow_mut().push(id));
        RegistryGuard { guard, id }
    }

    fn require_described(&self, argument: &'static str, key: TypeKey) -> Result<Arc<TypeInfo>> {
        self.catalog.get(key).ok_or_else(|| {
            InjectError::invalid_argument(argument, format!("type `{key}` is not described"))
        })
    }

    fn resolve_with(
        &self,
        registry: &mut Registry,
        key: TypeKey,
        activating: &mut Vec<TypeKey>,
    ) -> Result<Instance> {
        if let Some(instance) = registry.instances.get(&key) {
            tracing::trace!(key = %key, "Resolved from cache");
            return Ok(instance.clone());
        }

        let target = registry.types.get(&key).copied().unwrap_or(key);
        let info = self.require_described("key", target)?;
        Self::validate(key, &info, activating)?;

        activating.push(target);
        let built = self.build(registry, &info, activating);
        activating.pop();

        let instance = self
            .catalog
            .convert(&built?, key)
            .ok_or_else(|| InjectError::downcast_failed(key.name()))?;

        tracing::debug!(key = %key, target = %target, "Resolved new instance");
        registry.instances.insert(key, instance.clone());
        Ok(instance)
    }

    fn validate(key: TypeKey, info: &TypeInfo, activating: &[TypeKey]) -> Result<()> {
        if activating.contains(&info.key()) {
            tracing::debug!(key = %key, depth = activating.len(), "Circular dependency");
            return Err(InjectError::circular(key, activating));
        }

        if info.is_abstract() {
            return Err(InjectError::not_constructible(
                info.key(),
                Unconstructible::Abstract,
            ));
        }

        Ok(())
    }

    fn build(
        &self,
        registry: &mut Registry,
        info: &TypeInfo,
        activating: &mut Vec<TypeKey>,
    ) -> Result<Instance> {
        let access = self.config.constructor_access;
        let accessible: Vec<_> = info
            .constructors()
            .iter()
            .filter(|ctor| access.permits(ctor.visibility()))
            .collect();

        let constructor = match accessible.as_slice() {
            [constructor] => *constructor,
            [] => {
                return Err(InjectError::not_constructible(
                    info.key(),
                    Unconstructible::NoAccessibleConstructor,
                ));
            }
            many => {
                return Err(InjectError::not_constructible(
                    info.key(),
                    Unconstructible::AmbiguousConstructors { count: many.len() },
                ));
            }
        };

        let mut args = Vec::with_capacity(constructor.parameters().len());
        for dependency in constructor.parameters() {
            self.catalog.describe(*dependency)?;
            args.push(self.resolve_with(registry, dependency.key(), activating)?);
        }

        constructor.invoke(args)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
