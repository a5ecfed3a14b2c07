//! Agent module - identities, the conversation loop, and queue-wrapped
//! services

pub mod conversation;
pub mod definition;
pub mod rate_limit;
pub mod roster;
pub mod service;

pub use conversation::{CompletionHandler, ConversationLoop, ReportCompletion};
pub use definition::{Agent, AgentBuilder};
pub use rate_limit::RateLimiter;
pub use roster::default_registry;
pub use service::{AgentService, PromptRequest, Registry};
