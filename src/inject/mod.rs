//! Injection points: declared types, parameter lists and injectable members.

mod injected;
mod members;

pub use injected::{Argument, Injected, Parameters};
pub use members::{FieldBuilder, Injectable, Members, MethodBuilder};

pub(crate) use members::inject_into;
