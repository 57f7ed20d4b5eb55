use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Severity {
    /// Map a server flash category; anything unknown is informational
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "error" | "danger" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✔",
            Severity::Error => "✖",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    }
}

/// A dismissible banner at the top of the main content area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NoticeId,
    pub message: String,
    pub severity: Severity,
}

/// Banners in display order, newest first. Each one owns its own
/// dismiss timer, there is no shared queue.
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> NoticeId {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        // Inserted before the current first child
        self.items.insert(
            0,
            Notification {
                id,
                message: message.into(),
                severity,
            },
        );
        id
    }

    /// Returns false if the banner is already gone
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Dismiss the banner on top (the close control of the newest one)
    pub fn dismiss_top(&mut self) -> Option<NoticeId> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.remove(0).id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|n| n.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_banner_is_on_top() {
        let mut notices = Notifications::default();
        notices.push("first", Severity::Info);
        notices.push("second", Severity::Error);

        let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_dismiss_is_per_banner() {
        let mut notices = Notifications::default();
        let a = notices.push("a", Severity::Info);
        let b = notices.push("b", Severity::Info);

        assert!(notices.dismiss(a));
        assert!(!notices.dismiss(a));
        assert_eq!(notices.iter().next().map(|n| n.id), Some(b));
    }

    #[test]
    fn test_flash_categories() {
        assert_eq!(Severity::from_category("error"), Severity::Error);
        assert_eq!(Severity::from_category("Success"), Severity::Success);
        assert_eq!(Severity::from_category("message"), Severity::Info);
    }
}
