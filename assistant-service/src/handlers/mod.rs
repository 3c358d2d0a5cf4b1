pub mod assistants;
pub mod health;
pub mod metrics;

pub use assistants::{
    delete_assistant, delete_assistant_named_health, get_assistant, list_assistants,
    send_message, send_message_to_health, upsert_assistant,
};
pub use health::health_check;
pub use metrics::metrics;
