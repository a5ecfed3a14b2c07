//! Troupe - Multi-Agent LLM Orchestration Engine
//!
//! Named agents, each a turn-taking conversation loop over a model backend,
//! wrapped in queue-fed services so agents can run concurrently and invoke
//! each other by name.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Model**: Backend abstraction selected by MSN, with Anthropic and
//!   noop implementations
//! - **Tools**: Tool dispatch and the built-in tool set, including
//!   inter-agent invocation
//! - **Agent**: Agent definitions, the conversation loop, rate limiting,
//!   and queue-wrapped agent services
//!
//! # Usage
//!
//! ```rust,no_run
//! use troupe::agent::default_registry;
//! use troupe::core::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load();
//!     let registry = default_registry(&config)?;
//!
//!     let manager = registry.service("Manager")?;
//!     manager.send_to("Summarize main.rs.").await?;
//!     let response = manager.receive_from().await?;
//!     println!("{}", response);
//!
//!     registry.shutdown();
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod core;
pub mod model;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentService, ConversationLoop, Registry};
pub use core::{Config, Result, TroupeError};
