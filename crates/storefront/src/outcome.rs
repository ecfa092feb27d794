use serde::Serialize;
use std::fmt;

/// A side effect that failed without failing the operation it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Warning {
    DownloadLog(String),
    DownloadCounter(String),
    Notification(String),
    StatusTransition(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DownloadLog(e) => write!(f, "download log not written: {}", e),
            Warning::DownloadCounter(e) => write!(f, "download count not incremented: {}", e),
            Warning::Notification(e) => write!(f, "email notification failed: {}", e),
            Warning::StatusTransition(e) => write!(f, "ticket status not updated: {}", e),
        }
    }
}

/// Primary result of an operation plus the best-effort steps that did not go through
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn has_notification_failure(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, Warning::Notification(_)))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Take over the warnings of a chained operation and hand back its value
    pub fn absorb<U>(&mut self, other: Outcome<U>) -> U {
        self.warnings.extend(other.warnings);
        other.value
    }
}
