pub mod assistant;

pub use assistant::{Assistant, UpsertOutcome, Upserted};
