//! Append-only task log shown under the buttons.

use crate::palette::ColorBook;
use egui::Color32;

/// Entry kind; decides the color when no action color applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
    Success,
}

impl LogKind {
    pub fn default_color(self) -> Color32 {
        match self {
            LogKind::Info => Color32::from_rgb(0xB0, 0xFF, 0xB0),
            LogKind::Error => Color32::from_rgb(0xFF, 0x80, 0x80),
            LogKind::Success => Color32::from_rgb(0x80, 0xFF, 0xFF),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub kind: LogKind,
    /// Display name of the action this entry belongs to, if any.
    pub action: Option<String>,
    pub color: Color32,
}

#[derive(Debug, Default, Clone)]
pub struct LogView {
    entries: Vec<LogEntry>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. The color is resolved now: the action's assigned
    /// color when `action` is known to `colors`, the kind default otherwise.
    pub fn push(
        &mut self,
        text: impl Into<String>,
        kind: LogKind,
        action: Option<&str>,
        colors: &ColorBook,
    ) {
        let color = action
            .and_then(|name| colors.get(name))
            .unwrap_or_else(|| kind.default_color());
        let entry = LogEntry {
            text: text.into(),
            kind,
            action: action.map(str::to_string),
            color,
        };
        match kind {
            LogKind::Error => tracing::warn!(action = ?entry.action, "{}", entry.text),
            _ => tracing::info!(action = ?entry.action, "{}", entry.text),
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
