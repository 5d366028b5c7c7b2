pub mod config;
pub mod error;
pub mod core {
    pub mod events;
    pub mod model;
    pub mod runtime;
    pub mod state;
}
pub mod ai {
    pub mod client;
    pub mod gateway;
    pub mod prompts;
    pub mod schema_utils;
}
pub mod orchestrator;

pub use crate::ai::client::{GeminiClient, ModelTransport};
pub use crate::ai::gateway::ModelGateway;
pub use crate::config::ForgeConfig;
pub use crate::core::runtime::Runtime;
pub use crate::error::ForgeError;
