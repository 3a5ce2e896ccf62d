use serde::Serialize;

/// The tagged value a field holds.
///
/// A field keeps one kind for its whole life; edits carrying another kind are
/// refused by the owning context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text, stored exactly as typed.
    Text(String),
    /// One option out of a fixed list, or nothing selected.
    Choice(Option<String>),
    /// Identifier of a server entity (a study room), or nothing selected.
    Entity(Option<u64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Choice,
    Entity,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Choice => "choice",
            ValueKind::Entity => "entity",
        }
    }
}

impl FieldValue {
    pub fn text(text: impl Into<String>) -> Self {
        FieldValue::Text(text.into())
    }

    pub fn choice(option: impl Into<String>) -> Self {
        FieldValue::Choice(Some(option.into()))
    }

    pub fn entity(id: u64) -> Self {
        FieldValue::Entity(Some(id))
    }

    /// The empty value of the given kind.
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => FieldValue::Text(String::new()),
            ValueKind::Choice => FieldValue::Choice(None),
            ValueKind::Entity => FieldValue::Entity(None),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Choice(_) => ValueKind::Choice,
            FieldValue::Entity(_) => ValueKind::Entity,
        }
    }

    /// Nothing entered: whitespace-only text or no selection.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Choice(option) => option.as_deref().map_or(true, |o| o.trim().is_empty()),
            FieldValue::Entity(id) => id.is_none(),
        }
    }

    /// Raw text of a text value or the selected option of a choice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Choice(option) => option.as_deref(),
            FieldValue::Entity(_) => None,
        }
    }

    /// Text with surrounding whitespace removed; empty for entities and empty
    /// selections. This is what requests carry.
    pub fn trimmed(&self) -> &str {
        self.as_str().map_or("", str::trim)
    }

    pub fn as_entity(&self) -> Option<u64> {
        match self {
            FieldValue::Entity(id) => *id,
            _ => None,
        }
    }
}
