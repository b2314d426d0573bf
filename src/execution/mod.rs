pub mod engine;
pub mod polars_engine;
pub mod postgres_engine;

pub use engine::*;
pub use polars_engine::*;
pub use postgres_engine::*;
