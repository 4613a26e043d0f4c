mod loader;
mod model;
mod op_id;
mod refs;
mod security;
mod shape;

pub use loader::OpenApiError;
pub use model::{OpenApiDoc, OpenApiParam, OpenApiParamLocation, ResolvedOperation};
pub use refs::RefError;
