//! Physical model to SQL DDL.

mod dialect;
mod emitter;
mod types;

pub use dialect::Dialect;
pub use emitter::{emit, emit_tables, emit_with_dialect};
pub use types::render_type;
