use std::sync::Arc;

use serde::Deserialize;

/// Decision over a status code (warn, alarm, notify)
///
/// Implemented for plain closures, so callers can swap in custom rules
/// without touching the stages that consume them.
pub trait StatusPolicy: Send + Sync {
    fn applies(&self, status: u16) -> bool;
}

impl<F> StatusPolicy for F
where
    F: Fn(u16) -> bool + Send + Sync,
{
    fn applies(&self, status: u16) -> bool {
        self(status)
    }
}

/// Shared handle to a status policy
pub type SharedPolicy = Arc<dyn StatusPolicy>;

/// Set of status codes described as data
///
/// Ranges are half-open (`[start, end)`); `codes` lists individual extras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusSet {
    #[serde(default)]
    pub ranges: Vec<[u16; 2]>,
    #[serde(default)]
    pub codes: Vec<u16>,
}

impl StatusSet {
    /// `[400, 500)`
    pub fn client_errors() -> Self {
        Self {
            ranges: vec![[400, 500]],
            codes: Vec::new(),
        }
    }

    /// `[500, 600)`
    pub fn server_errors() -> Self {
        Self {
            ranges: vec![[500, 600]],
            codes: Vec::new(),
        }
    }

    /// Add an individual code to the set
    #[must_use]
    pub fn with_code(mut self, status: u16) -> Self {
        self.codes.push(status);
        self
    }

    pub fn contains(&self, status: u16) -> bool {
        self.codes.contains(&status) || self.ranges.iter().any(|[start, end]| (*start..*end).contains(&status))
    }
}

impl StatusPolicy for StatusSet {
    fn applies(&self, status: u16) -> bool {
        self.contains(status)
    }
}

/// Default warning rule: client errors
pub const fn should_warn(status: u16) -> bool {
    400 <= status && status < 500
}

/// Default alarm rule: server errors
pub const fn should_alarm(status: u16) -> bool {
    500 <= status && status < 600
}

/// Default notification rule: server errors
pub const fn should_notify(status: u16) -> bool {
    should_alarm(status)
}

/// Warn and alarm policies consumed by the response stage
#[derive(Clone)]
pub struct ClassificationPolicy {
    pub warn: SharedPolicy,
    pub alarm: SharedPolicy,
}

impl ClassificationPolicy {
    pub fn new(warn: SharedPolicy, alarm: SharedPolicy) -> Self {
        Self { warn, alarm }
    }

    pub fn should_warn(&self, status: u16) -> bool {
        self.warn.applies(status)
    }

    pub fn should_alarm(&self, status: u16) -> bool {
        self.alarm.applies(status)
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            warn: Arc::new(should_warn),
            alarm: Arc::new(should_alarm),
        }
    }
}

impl std::fmt::Debug for ClassificationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationPolicy").finish_non_exhaustive()
    }
}
