use proc_macro::TokenStream;

mod injectable;

/// Derive macro describing a struct to the DI container
///
/// Every field must be an `Arc<T>`; the generated constructor takes one parameter per
/// field, in declaration order. Use `#[injectable(implements(...))]` to declare the
/// traits the struct can be resolved as.
///
/// # Example
/// ```ignore
/// use inject::DeriveInjectable;
///
/// #[derive(DeriveInjectable)]
/// #[injectable(implements(UserService))]
/// pub struct DefaultUserService {
///     repository: Arc<dyn UserRepository>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
