//! Model service name parsing
//!
//! An MSN is similar to a DSN ("Data Source Name" used to identify
//! databases): it names a model api service, a model name/variant, and any
//! extra flags.
//!
//! Syntax is `service[/model[/flags]]`, where flags is a comma separated
//! list of `key=value` pairs, split on the first `=` only.

use crate::core::{Result, TroupeError};

/// A parsed model service name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msn {
    /// Service selector, e.g. `anthropic`
    pub service: String,
    /// Model name/variant; the service default is used when absent
    pub model: Option<String>,
    /// Extra flags, in declaration order
    pub flags: Vec<(String, String)>,
}

impl Msn {
    /// Parse an MSN string.
    ///
    /// Splits on `/` into at most 3 parts. Whether the service part names a
    /// registered backend is resolved later, at backend construction.
    pub fn parse(msn: &str) -> Result<Self> {
        let mut parts = msn.splitn(3, '/');

        let service = match parts.next() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(TroupeError::UnknownService(String::new())),
        };

        let model = parts
            .next()
            .filter(|m| !m.is_empty())
            .map(|m| m.to_string());

        let flags = match parts.next() {
            Some(raw) => parse_flags(raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            service,
            model,
            flags,
        })
    }
}

/// Parse the flags segment into `(key, value)` pairs, splitting each pair on
/// the first `=` only
fn parse_flags(raw: &str) -> Result<Vec<(String, String)>> {
    let mut flags = Vec::new();
    for pair in raw.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| TroupeError::MalformedFlag(pair.to_string()))?;
        flags.push((key.to_string(), value.to_string()));
    }
    Ok(flags)
}
