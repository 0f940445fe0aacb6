mod generation;
mod options;
mod schema;
mod selection;

pub use generation::Generation;
pub use options::{DisplayOptions, DisplayOptionsPatch};
pub use schema::{
    Argument, BUILT_IN_SCALARS, Deprecation, EnumValue, Field, KindTag, Schema, SchemaType,
    TypeKind, TypeRef, Wrapper,
};
pub use selection::Selection;
