//! Name and description fields shared by named builders

use crate::id::normalize_name;
use crate::{Error, Result};

/// Name and description accumulated by a builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct NamedFields {
    name: Option<String>,
    description: Option<String>,
}

impl NamedFields {
    pub(crate) fn set_name(&mut self, raw: &str) -> Result<()> {
        self.name = Some(normalize_name(raw)?);
        Ok(())
    }

    pub(crate) fn add_description(&mut self, fragment: &str) {
        self.description = join_description(self.description.take(), fragment);
    }

    pub(crate) fn name(&self, context: &'static str) -> Result<&str> {
        self.name.as_deref().ok_or(Error::MissingFields {
            context,
            missing: "NAME".to_string(),
        })
    }

    pub(crate) fn description(&self) -> Option<String> {
        self.description.clone()
    }
}

/// Append a description fragment, ending the existing text with a full stop
/// unless it already ends in `.`, `!` or `?`. Blank fragments are ignored.
#[must_use]
pub fn join_description(existing: Option<String>, fragment: &str) -> Option<String> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return existing;
    }
    match existing {
        None => Some(fragment.to_string()),
        Some(mut text) => {
            if !text.ends_with(['.', '!', '?']) {
                text.push('.');
            }
            text.push(' ');
            text.push_str(fragment);
            Some(text)
        }
    }
}
