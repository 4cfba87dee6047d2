//! Type descriptions consumed by the container.
//!
//! Rust has no runtime reflection, so every participating type describes itself with a
//! [`TypeInfo`]: whether it is abstract, which abstractions it can be converted to, and the
//! constructors the container may call. Descriptions are usually produced through the
//! [`Injectable`](crate::di::Injectable) trait, either by hand, with `#[derive(Injectable)]`,
//! or with [`abstraction!`](crate::abstraction).

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::di::{Dependency, Injectable, Instance, TypeKey};
use crate::error::{BoxError, InjectError, Result};

type Invoker = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;
type Cast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// A declared conversion to an abstraction, which the catalog can describe on demand.
#[derive(Clone)]
struct Conversion {
    target: Dependency,
    cast: Cast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    /// Trait objects and other types that can never be instantiated directly.
    Abstract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Resolved constructor arguments, consumed in declared order.
pub struct Arguments {
    values: std::vec::IntoIter<Instance>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Instance>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    pub fn take<T: ?Sized + 'static>(&mut self) -> Result<Arc<T>> {
        let instance = self
            .values
            .next()
            .ok_or_else(|| InjectError::downcast_failed(std::any::type_name::<T>()))?;
        instance
            .downcast::<T>()
            .ok_or_else(|| InjectError::downcast_failed(std::any::type_name::<T>()))
    }
}

/// A callable that can act as a constructor.
///
/// Implemented for closures taking up to twelve `Arc<_>` parameters, each of which names an
/// [`Injectable`] dependency. `R` is whatever the closure returns.
pub trait Factory<Args, R>: Send + Sync + 'static {
    fn dependencies(&self) -> Vec<Dependency>;

    fn call(&self, args: &mut Arguments) -> Result<R>;
}

macro_rules! impl_factory {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Factory<($(Arc<$ty>,)*), R> for F
        where
            F: Fn($(Arc<$ty>),*) -> R + Send + Sync + 'static,
            $($ty: Injectable + ?Sized,)*
        {
            fn dependencies(&self) -> Vec<Dependency> {
                vec![$(Dependency::of::<$ty>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(&self, args: &mut Arguments) -> Result<R> {
                $(let $ty = args.take::<$ty>()?;)*
                Ok((self)($($ty),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(T1);
impl_factory!(T1, T2);
impl_factory!(T1, T2, T3);
impl_factory!(T1, T2, T3, T4);
impl_factory!(T1, T2, T3, T4, T5);
impl_factory!(T1, T2, T3, T4, T5, T6);
impl_factory!(T1, T2, T3, T4, T5, T6, T7);
impl_factory!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_factory!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_factory!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_factory!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_factory!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);

/// One way of building a concrete type.
#[derive(Clone)]
pub struct ConstructorInfo {
    visibility: Visibility,
    parameters: Vec<Dependency>,
    invoke: Invoker,
}

impl ConstructorInfo {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[Dependency] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, args: Vec<Instance>) -> Result<Instance> {
        (self.invoke)(Arguments::new(args))
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("visibility", &self.visibility)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Everything the container knows about a type.
#[derive(Clone)]
pub struct TypeInfo {
    key: TypeKey,
    kind: TypeKind,
    constructors: Vec<ConstructorInfo>,
    conversions: HashMap<TypeKey, Conversion>,
}

impl TypeInfo {
    pub fn concrete<T: Send + Sync + 'static>() -> TypeInfoBuilder<T> {
        TypeInfoBuilder::new(TypeKind::Concrete)
    }

    pub fn abstraction<T: ?Sized + Send + Sync + 'static>() -> TypeInfoBuilder<T> {
        TypeInfoBuilder::new(TypeKind::Abstract)
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// Whether this type is `key` or declares a conversion to it.
    ///
    /// Chains through other abstractions are followed by
    /// [`TypeCatalog::is_assignable`](crate::di::TypeCatalog::is_assignable).
    pub fn conforms_to(&self, key: TypeKey) -> bool {
        self.key == key || self.conversions.contains_key(&key)
    }

    /// Re-type an instance of this type as `key`, keeping its identity.
    pub fn convert(&self, instance: &Instance, key: TypeKey) -> Option<Instance> {
        if instance.key() != self.key {
            return None;
        }
        if key == self.key {
            return Some(instance.clone());
        }
        self.conversions
            .get(&key)
            .and_then(|conversion| (conversion.cast)(instance))
    }

    /// Abstractions this type declares a conversion to.
    pub fn conversion_targets(&self) -> impl Iterator<Item = Dependency> + '_ {
        self.conversions.values().map(|conversion| conversion.target)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("constructors", &self.constructors)
            .field("conversions", &self.conversions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder returned by [`TypeInfo::concrete`] and [`TypeInfo::abstraction`].
///
/// # Example
/// ```
/// use inject::{abstraction, Injectable, TypeInfo};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {}
/// abstraction!(dyn Logger);
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
///
/// impl Injectable for ConsoleLogger {
///     fn type_info() -> TypeInfo {
///         TypeInfo::concrete::<Self>()
///             .implements::<dyn Logger>(|this| this as Arc<dyn Logger>)
///             .constructor(|| ConsoleLogger)
///             .build()
///     }
/// }
/// ```
pub struct TypeInfoBuilder<T: ?Sized> {
    info: TypeInfo,
    _marker: PhantomData<fn(Arc<T>)>,
}

impl<T: ?Sized + Send + Sync + 'static> TypeInfoBuilder<T> {
    fn new(kind: TypeKind) -> Self {
        Self {
            info: TypeInfo {
                key: TypeKey::of::<T>(),
                kind,
                constructors: Vec::new(),
                conversions: HashMap::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Declare that `T` may stand in for `U`.
    pub fn implements<U: Injectable + ?Sized>(
        mut self,
        cast: impl Fn(Arc<T>) -> Arc<U> + Send + Sync + 'static,
    ) -> Self {
        let erased: Cast = Arc::new(move |instance: &Instance| {
            instance
                .downcast::<T>()
                .map(|value| Instance::new::<U>(cast(value)))
        });
        let target = Dependency::of::<U>();
        self.info
            .conversions
            .insert(target.key(), Conversion { target, cast: erased });
        self
    }

    pub fn build(self) -> TypeInfo {
        self.info
    }
}

impl<T: Send + Sync + 'static> TypeInfoBuilder<T> {
    /// Add a public constructor.
    pub fn constructor<Args, F>(self, factory: F) -> Self
    where
        F: Factory<Args, T>,
    {
        self.push(Visibility::Public, factory, |value| Ok(value))
    }

    /// Add a public constructor that may fail. The error is kept as the
    /// `ConstructionFailed` source.
    pub fn try_constructor<Args, E, F>(self, factory: F) -> Self
    where
        E: Into<BoxError> + 'static,
        F: Factory<Args, std::result::Result<T, E>>,
    {
        self.push(Visibility::Public, factory, |value| value.map_err(Into::into))
    }

    /// Add a constructor that only counts under `ConstructorAccess::Any`.
    pub fn private_constructor<Args, F>(self, factory: F) -> Self
    where
        F: Factory<Args, T>,
    {
        self.push(Visibility::Private, factory, |value| Ok(value))
    }

    fn push<Args, R, F>(
        mut self,
        visibility: Visibility,
        factory: F,
        finish: fn(R) -> std::result::Result<T, BoxError>,
    ) -> Self
    where
        R: 'static,
        F: Factory<Args, R>,
    {
        let key = self.info.key;
        let parameters = factory.dependencies();
        let invoke: Invoker = Arc::new(move |mut args: Arguments| {
            let value = finish(factory.call(&mut args)?)
                .map_err(|source| InjectError::construction_failed(key, source))?;
            Ok(Instance::new(Arc::new(value)))
        });
        self.info.constructors.push(ConstructorInfo {
            visibility,
            parameters,
            invoke,
        });
        self
    }
}
