use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::di::{Injectable, TypeInfo};

/// Runtime identity of a requested abstraction or concrete type.
///
/// Equality and hashing only consider the `TypeId`; the name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A [`TypeKey`] that knows how to describe its type on demand.
///
/// Constructor parameters and the generic container entry points carry these so the
/// type catalog can be filled lazily instead of requiring every type up front.
#[derive(Clone, Copy)]
pub struct Dependency {
    key: TypeKey,
    describe: fn() -> TypeInfo,
}

impl Dependency {
    pub fn of<T: Injectable + ?Sized>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            describe: T::type_info,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub(crate) fn describe(&self) -> TypeInfo {
        (self.describe)()
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dependency").field(&self.key.name).finish()
    }
}
