//! Placeholder substitution for countdown titles.
//!
//! Templates may contain the fixed tokens `%time_left%`, `%time_elapsed%`
//! and `%players_shown%`, plus any caller-supplied tokens.
//!
//! Substitution is a single left-to-right pass over the template. At each
//! position fixed tokens are tried first, then custom tokens in insertion
//! order. Replacement values are copied verbatim and never scanned again,
//! so a value that happens to contain token text is left as is. Token text
//! cannot be escaped inside a template.

use serde::{Deserialize, Serialize};

use crate::countdown::CountdownState;
use crate::error::TimerError;

/// Separator between viewer names in `%players_shown%`.
pub const VIEWER_SEPARATOR: &str = ", ";

// ============================================================================
// Placeholder
// ============================================================================

/// Tokens that every countdown can fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Remaining time, one decimal place.
    TimeLeft,
    /// Elapsed time, one decimal place.
    TimeElapsed,
    /// Display names of everyone the notification is shown to.
    PlayersShown,
}

impl Placeholder {
    /// Every fixed placeholder, in substitution precedence order.
    pub const ALL: [Placeholder; 3] = [
        Placeholder::TimeLeft,
        Placeholder::TimeElapsed,
        Placeholder::PlayersShown,
    ];

    /// Returns the token text as it appears in templates.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::TimeLeft => "%time_left%",
            Placeholder::TimeElapsed => "%time_elapsed%",
            Placeholder::PlayersShown => "%players_shown%",
        }
    }

    /// Returns true if `template` contains this token.
    pub fn appears_in(&self, template: &str) -> bool {
        template.contains(self.token())
    }
}

// ============================================================================
// PlaceholderContext
// ============================================================================

/// Values for the fixed placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderContext {
    pub time_left: f64,
    pub time_elapsed: f64,
    /// Viewer names; `None` when the notification has no viewer list.
    pub viewers: Option<Vec<String>>,
}

impl PlaceholderContext {
    /// Creates a context without a viewer list.
    pub fn new(time_left: f64, time_elapsed: f64) -> Self {
        Self {
            time_left,
            time_elapsed,
            viewers: None,
        }
    }

    /// Creates a context from the current countdown values.
    ///
    /// An overshot final step reports zero time left.
    pub fn from_state(state: &CountdownState) -> Self {
        Self::new(state.remaining().max(0.0), state.elapsed())
    }

    /// Attaches a viewer list.
    #[must_use]
    pub fn with_viewers(mut self, viewers: Vec<String>) -> Self {
        self.viewers = Some(viewers);
        self
    }

    fn value_of(&self, placeholder: Placeholder) -> Option<String> {
        match placeholder {
            Placeholder::TimeLeft => Some(format_time(self.time_left)),
            Placeholder::TimeElapsed => Some(format_time(self.time_elapsed)),
            Placeholder::PlayersShown => self
                .viewers
                .as_ref()
                .map(|viewers| viewers.join(VIEWER_SEPARATOR)),
        }
    }
}

fn format_time(value: f64) -> String {
    format!("{:.1}", value)
}

// ============================================================================
// CustomPlaceholders
// ============================================================================

/// Caller-supplied token/value pairs, kept in insertion order.
///
/// Inserting an existing token replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomPlaceholders(Vec<(String, String)>);

impl CustomPlaceholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `token` to `value`. The last write for a token wins.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == token) {
            Some(entry) => entry.1 = value,
            None => self.0.push((token, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == token)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(token, value)| (token.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomPlaceholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Self::new();
        for (token, value) in iter {
            placeholders.insert(token, value);
        }
        placeholders
    }
}

// ============================================================================
// Substitution
// ============================================================================

/// Replaces fixed and custom tokens in `template`.
///
/// Empty custom tokens are ignored.
///
/// # Errors
///
/// Returns [`TimerError::MissingContext`] when the template uses
/// `%players_shown%` and `context` carries no viewer list.
pub fn substitute(
    template: &str,
    context: &PlaceholderContext,
    custom: &CustomPlaceholders,
) -> Result<String, TimerError> {
    let mut replacements: Vec<(&str, String)> = Vec::with_capacity(3 + custom.len());
    for placeholder in Placeholder::ALL {
        match context.value_of(placeholder) {
            Some(value) => replacements.push((placeholder.token(), value)),
            None if placeholder.appears_in(template) => {
                return Err(TimerError::MissingContext(placeholder.token().to_string()));
            }
            None => {}
        }
    }
    replacements.extend(
        custom
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .map(|(token, value)| (token, value.to_string())),
    );

    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for (token, value) in &replacements {
            if let Some(after) = rest.strip_prefix(token) {
                output.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            output.push(ch);
        }
        rest = chars.as_str();
    }
    Ok(output)
}

// ============================================================================
// Tests
// ============================================================================
