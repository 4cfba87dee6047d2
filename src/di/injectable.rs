use crate::di::TypeInfo;

/// Trait for types the container can reason about
///
/// Concrete types usually get this from `#[derive(Injectable)]`, trait objects from
/// [`abstraction!`](crate::abstraction). The returned [`TypeInfo`] must describe `Self`.
///
/// # Example
/// ```
/// use inject::{abstraction, DeriveInjectable, Container};
/// use std::sync::Arc;
///
/// // 1. Define a trait
/// trait UserRepository: Send + Sync {}
/// abstraction!(dyn UserRepository);
///
/// // 2. Implement it
/// #[derive(DeriveInjectable)]
/// #[injectable(implements(UserRepository))]
/// struct InMemoryUserRepository;
/// impl UserRepository for InMemoryUserRepository {}
///
/// // 3. Derive Injectable on a struct
/// #[derive(DeriveInjectable)]
/// pub struct UserService {
///     // This field will be resolved from the container
///     repository: Arc<dyn UserRepository>,
/// }
///
/// let container = Container::new();
/// container.register::<dyn UserRepository, InMemoryUserRepository>().unwrap();
/// let _service = container.resolve::<UserService>().unwrap();
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Describe the type's kind, conversions and constructors.
    fn type_info() -> TypeInfo;
}

/// Implement [`Injectable`] for trait objects.
///
/// Each entry may list the abstractions it upcasts to, which requires the trait to
/// declare them as supertraits.
///
/// ```
/// use inject::abstraction;
///
/// trait Named: Send + Sync {}
/// trait Greeter: Named {}
///
/// abstraction!(dyn Named; dyn Greeter: dyn Named);
/// ```
#[macro_export]
macro_rules! abstraction {
    ($($ty:ty $(: $($super:ty),+)?);+ $(;)?) => {
        $(
            impl $crate::Injectable for $ty {
                fn type_info() -> $crate::TypeInfo {
                    $crate::TypeInfo::abstraction::<Self>()
                        $($(
                            .implements::<$super>(|this| this as ::std::sync::Arc<$super>)
                        )+)?
                        .build()
                }
            }
        )+
    };
}
