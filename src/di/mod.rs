mod builder;
mod catalog;
mod container;
mod injectable;
mod instance;
mod key;
mod reflect;

pub use builder::ContainerBuilder;
pub use catalog::TypeCatalog;
pub use container::Container;
pub use injectable::Injectable;
pub use instance::Instance;
pub use key::{Dependency, TypeKey};
pub use reflect::{
    Arguments, ConstructorInfo, Factory, TypeInfo, TypeInfoBuilder, TypeKind, Visibility,
};
