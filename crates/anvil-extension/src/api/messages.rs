//! Diagnostics reported by callbacks

use anvil_model::{BeanInfo, DeclarationKey, ObserverInfo};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Informational
    Info,
    /// Suspicious but not fatal unless warnings are fatal
    Warning,
    /// Fails the build once the phase completes
    Error,
}

/// What a message is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageContext {
    /// A declaration
    Declaration(DeclarationKey),
    /// A bean, by id
    Bean(String),
    /// An observer, by id
    Observer(String),
}

impl From<DeclarationKey> for MessageContext {
    fn from(key: DeclarationKey) -> Self {
        Self::Declaration(key)
    }
}

impl From<&BeanInfo> for MessageContext {
    fn from(bean: &BeanInfo) -> Self {
        Self::Bean(bean.id.clone())
    }
}

impl From<&ObserverInfo> for MessageContext {
    fn from(observer: &ObserverInfo) -> Self {
        Self::Observer(observer.id.clone())
    }
}

impl Display for MessageContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(key) => write!(f, "{key}"),
            Self::Bean(id) => write!(f, "bean {id}"),
            Self::Observer(id) => write!(f, "observer {id}"),
        }
    }
}

/// One reported message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Severity
    pub level: Level,
    /// Text
    pub text: String,
    /// Subject
    pub context: Option<MessageContext>,
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} ({context})", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Diagnostics sink shared by every callback of a build
#[derive(Debug, Default)]
pub struct Messages {
    entries: Mutex<Vec<Message>>,
}

impl Messages {
    /// Create empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report informational message
    pub fn info(&self, text: impl Into<String>, context: Option<MessageContext>) {
        self.report(Level::Info, text.into(), context);
    }

    /// Report warning
    pub fn warning(&self, text: impl Into<String>, context: Option<MessageContext>) {
        self.report(Level::Warning, text.into(), context);
    }

    /// Report error
    pub fn error(&self, text: impl Into<String>, context: Option<MessageContext>) {
        self.report(Level::Error, text.into(), context);
    }

    fn report(&self, level: Level, text: String, context: Option<MessageContext>) {
        let message = Message { level, text, context };
        match level {
            Level::Info => tracing::info!(message = %message, "Extension message"),
            Level::Warning => tracing::warn!(message = %message, "Extension warning"),
            Level::Error => tracing::error!(message = %message, "Extension error"),
        }
        self.entries.lock().push(message);
    }

    /// Every message so far, in report order
    #[must_use]
    pub fn all(&self) -> Vec<Message> {
        self.entries.lock().clone()
    }

    /// Messages at `level` or above
    #[must_use]
    pub fn at_least(&self, level: Level) -> Vec<Message> {
        self.entries.lock().iter().filter(|m| m.level >= level).cloned().collect()
    }

    /// Number of messages at `level` or above
    #[must_use]
    pub fn count_at_least(&self, level: Level) -> usize {
        self.entries.lock().iter().filter(|m| m.level >= level).count()
    }

    /// Check for errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count_at_least(Level::Error) > 0
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing was reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_model::ClassKey;

    #[test]
    fn messages_filter_by_level() {
        let messages = Messages::new();
        messages.info("scanning", None);
        messages.warning("odd", None);
        messages.error("broken", Some(DeclarationKey::Class(ClassKey::new("a.B")).into()));

        assert_eq!(messages.len(), 3);
        assert_eq!(messages.count_at_least(Level::Warning), 2);
        assert!(messages.has_errors());
        let errors = messages.at_least(Level::Error);
        assert_eq!(errors[0].to_string(), "broken (a.B)");
    }
}
