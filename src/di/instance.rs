use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::di::TypeKey;

/// A shared, type-erased object held by the container.
///
/// The payload is always an `Arc<T>` where `T` is the type recorded in [`Instance::key`],
/// so trait objects (`Arc<dyn Trait>`) and concrete values are handled the same way.
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    address: usize,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            address: Arc::as_ptr(&value) as *const () as usize,
            value: Arc::new(value),
        }
    }

    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    /// The type this handle is typed as.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn type_name(&self) -> &'static str {
        self.key.name()
    }

    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Whether both handles point at the same object, even when typed differently.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        self.address == other.address
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.key.name())
            .field("address", &format_args!("{:#x}", self.address))
            .finish()
    }
}
