//! Table-driven proxy runtime
//!
//! [`ProxyClass`] is what [`TableMaterializer`] produces: the generated
//! class description plus the bound original implementations. Instances
//! evaluate the synthesized bodies directly.
//!
//! [`TableMaterializer`]: crate::materialize::TableMaterializer

mod accessor;
mod eval;
mod instance;
mod value;

pub use accessor::{
    accessor_for, NullObjectAccessor, PassthroughAccessor, PropertyAccessor, PropertyStore,
};
pub use instance::{InstanceSnapshot, ProxyClass, ProxyInstance};
pub use value::Value;
