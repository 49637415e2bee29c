mod engine;
mod expr;
mod faker;
mod model;

pub use engine::{RowInsert, SeedEngine};
pub use expr::ExprEvaluator;
pub use faker::generate_fake;
pub use model::{Seed, SeedCondition, SeedField};
