pub mod error;
pub mod metrics;
pub mod registry;

pub use error::RegistryError;
pub use registry::{AssistantStore, InMemoryAssistantStore};
