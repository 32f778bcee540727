//! Entity shape declaration and convention-based schema resolution.

mod descriptor;
mod resolver;
mod shape;

pub use descriptor::{EntityDescriptor, NavigationLink};
pub use resolver::descriptor;
pub use shape::{Entity, EntityShape, FieldSpec, NavigationSpec, TargetResolver};
