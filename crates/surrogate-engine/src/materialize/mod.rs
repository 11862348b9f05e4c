//! Materializers
//!
//! A materializer turns a [`GeneratedClass`] into something loadable. The
//! engine ships two:
//!
//! - [`SourceEmitter`] prints the class as TypeScript-flavored source text
//! - [`TableMaterializer`] builds a table-driven [`ProxyClass`] that
//!   evaluates the synthesized bodies directly
//!
//! [`ProxyClass`]: crate::runtime::ProxyClass

mod source;
mod table;

pub use source::SourceEmitter;
pub use table::{ImplementationTable, MethodImplementation, TableMaterializer};

use crate::builder::GeneratedClass;

/// Turns a generated class description into a loadable artifact
pub trait Materializer {
    /// Produced artifact
    type Output;
    /// Failure type
    type Error: std::error::Error;

    /// Materialize one class
    fn materialize(&self, class: &GeneratedClass) -> Result<Self::Output, Self::Error>;
}
