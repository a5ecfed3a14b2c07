//! Model service registry
//!
//! Maps the MSN service selector to a backend constructor.

use std::sync::Arc;

use crate::core::{Config, Result, TroupeError};
use crate::model::anthropic::AnthropicBackend;
use crate::model::backend::ModelBackend;
use crate::model::msn::Msn;
use crate::model::noop::NoopBackend;

/// MSN used when neither the agent nor the configuration names one
pub const DEFAULT_MSN: &str =
    "anthropic/claude-3-5-sonnet-20240620/anthropic-beta=max-tokens-3-5-sonnet-2024-07-15";

/// Construct the backend selected by a parsed MSN
pub fn create_backend(msn: &Msn, config: &Config) -> Result<Arc<dyn ModelBackend>> {
    match msn.service.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicBackend::new(msn, config)?)),
        "noop" => Ok(Arc::new(NoopBackend::new())),
        other => Err(TroupeError::UnknownService(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_service() {
        let msn = Msn::parse("banana/split").unwrap();
        let err = create_backend(&msn, &Config::default()).unwrap_err();
        assert!(matches!(err, TroupeError::UnknownService(s) if s == "banana"));
    }

    #[test]
    fn test_noop_service() {
        let msn = Msn::parse("noop").unwrap();
        let backend = create_backend(&msn, &Config::default()).unwrap();
        assert_eq!(backend.name(), "noop");
    }

    #[test]
    fn test_default_msn_parses() {
        let msn = Msn::parse(DEFAULT_MSN).unwrap();
        assert_eq!(msn.service, "anthropic");
        assert_eq!(msn.model.as_deref(), Some("claude-3-5-sonnet-20240620"));
        assert_eq!(msn.flags.len(), 1);
        assert_eq!(msn.flags[0].0, "anthropic-beta");
    }
}
