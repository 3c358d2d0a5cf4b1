pub mod assistant;

pub use assistant::{
    DeleteAssistantResponse, HealthDownResponse, HealthResponse, MessageRequest, MessageResponse,
    UpsertAssistantRequest, UpsertAssistantResponse,
};
pub use service_core::error::ErrorResponse;
