use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::di::{Dependency, Instance, TypeInfo, TypeKey};
use crate::error::{InjectError, Result};

/// Concurrent store of type descriptions, filled lazily from [`Dependency`] descriptors.
#[derive(Default)]
pub struct TypeCatalog {
    types: DashMap<TypeKey, Arc<TypeInfo>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Describe the dependency's type unless it is already known.
    pub fn describe(&self, dependency: Dependency) -> Result<Arc<TypeInfo>> {
        let key = dependency.key();
        if let Some(info) = self.get(key) {
            return Ok(info);
        }

        let info = dependency.describe();
        if info.key() != key {
            return Err(InjectError::invalid_argument(
                "key",
                format!("type info for `{key}` describes `{}`", info.key()),
            ));
        }

        tracing::trace!(key = %key, kind = ?info.kind(), "described type");
        Ok(self
            .types
            .entry(key)
            .or_insert_with(|| Arc::new(info))
            .clone())
    }

    pub fn get(&self, key: TypeKey) -> Option<Arc<TypeInfo>> {
        self.types.get(&key).map(|info| info.clone())
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.types.contains_key(&key)
    }

    /// Whether `from` may be registered or used where `to` is requested.
    ///
    /// Follows declared conversions through intermediate abstractions, so a type that
    /// implements `dyn Derived` is assignable to every abstraction `dyn Derived` upcasts to.
    pub fn is_assignable(&self, from: TypeKey, to: TypeKey) -> bool {
        from == to || self.conversion_path(from, to).is_some()
    }

    /// Re-type `instance` as `to`, keeping its identity.
    pub fn convert(&self, instance: &Instance, to: TypeKey) -> Option<Instance> {
        if instance.key() == to {
            return Some(instance.clone());
        }
        let path = self.conversion_path(instance.key(), to)?;
        path.windows(2).try_fold(instance.clone(), |current, step| {
            self.get(step[0])?.convert(&current, step[1])
        })
    }

    /// Shortest chain of declared conversions leading from `from` to `to`, both ends
    /// included. Abstractions met on the way are described as needed.
    fn conversion_path(&self, from: TypeKey, to: TypeKey) -> Option<Vec<TypeKey>> {
        let mut previous: HashMap<TypeKey, TypeKey> = HashMap::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut key = to;
                while let Some(&prev) = previous.get(&key) {
                    path.push(prev);
                    key = prev;
                }
                path.reverse();
                return Some(path);
            }

            let Some(info) = self.get(current) else {
                continue;
            };
            for target in info.conversion_targets() {
                let next = target.key();
                if next == from || previous.contains_key(&next) {
                    continue;
                }
                if self.describe(target).is_err() {
                    continue;
                }
                previous.insert(next, current);
                queue.push_back(next);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Injectable, abstraction};

    trait Machine: Send + Sync {}
    trait Engine: Machine {}
    trait Turbo: Engine {}
    abstraction!(dyn Machine; dyn Engine: dyn Machine; dyn Turbo: dyn Engine);

    struct Diesel;
    impl Machine for Diesel {}
    impl Engine for Diesel {}

    struct Supercharged;
    impl Machine for Supercharged {}
    impl Engine for Supercharged {}
    impl Turbo for Supercharged {}

    impl Injectable for Supercharged {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>()
                .implements::<dyn Turbo>(|this| this as Arc<dyn Turbo>)
                .constructor(|| Supercharged)
                .build()
        }
    }

    impl Injectable for Diesel {
        fn type_info() -> TypeInfo {
            TypeInfo::concrete::<Self>()
                .implements::<dyn Engine>(|this| this as Arc<dyn Engine>)
                .constructor(|| Diesel)
                .build()
        }
    }

    struct Liar;

    impl Injectable for Liar {
        fn type_info() -> TypeInfo {
            Diesel::type_info()
        }
    }

    #[test]
    fn test_describe_is_idempotent() {
        let catalog = TypeCatalog::new();
        let first = catalog.describe(Dependency::of::<Diesel>()).unwrap();
        let second = catalog.describe(Dependency::of::<Diesel>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_describe_rejects_mismatched_info() {
        let catalog = TypeCatalog::new();
        let err = catalog.describe(Dependency::of::<Liar>()).unwrap_err();
        assert!(matches!(err, InjectError::InvalidArgument { argument: "key", .. }));
        assert!(!catalog.contains(TypeKey::of::<Liar>()));
    }

    #[test]
    fn test_assignability() {
        let catalog = TypeCatalog::new();
        catalog.describe(Dependency::of::<Diesel>()).unwrap();
        catalog.describe(Dependency::of::<dyn Engine>()).unwrap();

        let diesel = TypeKey::of::<Diesel>();
        let engine = TypeKey::of::<dyn Engine>();
        assert!(catalog.is_assignable(diesel, engine));
        assert!(catalog.is_assignable(engine, engine));
        assert!(!catalog.is_assignable(engine, diesel));
    }

    #[test]
    fn test_convert_instance() {
        let catalog = TypeCatalog::new();
        catalog.describe(Dependency::of::<Diesel>()).unwrap();

        let diesel = Instance::from_value(Diesel);
        let engine = catalog
            .convert(&diesel, TypeKey::of::<dyn Engine>())
            .expect("diesel is an engine");
        assert!(engine.ptr_eq(&diesel));
        assert!(engine.downcast::<dyn Engine>().is_some());
        assert!(catalog.convert(&engine, TypeKey::of::<Diesel>()).is_none());
    }

    #[test]
    fn test_assignability_follows_abstraction_chain() {
        let catalog = TypeCatalog::new();
        catalog.describe(Dependency::of::<Supercharged>()).unwrap();

        let supercharged = TypeKey::of::<Supercharged>();
        assert!(catalog.is_assignable(supercharged, TypeKey::of::<dyn Turbo>()));
        assert!(catalog.is_assignable(supercharged, TypeKey::of::<dyn Engine>()));
        assert!(catalog.is_assignable(supercharged, TypeKey::of::<dyn Machine>()));
        assert!(!catalog.is_assignable(TypeKey::of::<dyn Machine>(), supercharged));
        assert!(!catalog.is_assignable(supercharged, TypeKey::of::<Diesel>()));

        // Intermediate abstractions were described along the way.
        assert!(catalog.contains(TypeKey::of::<dyn Engine>()));
    }

    #[test]
    fn test_convert_through_abstraction_chain() {
        let catalog = TypeCatalog::new();
        catalog.describe(Dependency::of::<Supercharged>()).unwrap();

        let concrete = Instance::from_value(Supercharged);
        let machine = catalog
            .convert(&concrete, TypeKey::of::<dyn Machine>())
            .expect("supercharged is a machine");
        assert_eq!(machine.key(), TypeKey::of::<dyn Machine>());
        assert!(machine.ptr_eq(&concrete));
        assert!(machine.downcast::<dyn Machine>().is_some());
    }
}
