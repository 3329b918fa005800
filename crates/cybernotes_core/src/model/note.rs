//! Note domain value.
//!
//! # Responsibility
//! - Define the canonical note record (title, body, color, priority, expiry).
//! - Provide the creation factory and copy-with-changes builders.
//!
//! # Invariants
//! - `uid` is assigned once, either generated (`Note::create`) or supplied by
//!   a load/merge path (`Note::with_uid`), and is never reassigned.
//! - Fields are private; a note is never mutated in place.

use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable note identifier.
///
/// Loaded records may carry any string, so this is not restricted to UUIDs.
pub type NoteUid = String;

/// Packed ARGB value of opaque white.
pub const DEFAULT_NOTE_COLOR: i32 = 0xFFFF_FFFF_u32 as i32;

/// Priority attached to a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

impl Importance {
    /// Symbolic name used in the persisted record.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        }
    }

    /// Parses an exact symbolic name. Returns `None` for anything else.
    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(Self::Low),
            "NORMAL" => Some(Self::Normal),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Importance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    uid: NoteUid,
    title: String,
    content: String,
    /// Packed ARGB.
    color: i32,
    importance: Importance,
    /// Only kept in memory; the persisted record has no key for it.
    self_destruct_date: Option<NaiveDate>,
}

impl Note {
    /// Creates a note with a freshly generated uid and default styling.
    pub fn create(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_uid(generate_uid(), title, content)
    }

    /// Creates a note with a caller-provided uid.
    ///
    /// Used by load and merge paths where identity already exists.
    pub fn with_uid(
        uid: impl Into<NoteUid>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            content: content.into(),
            color: DEFAULT_NOTE_COLOR,
            importance: Importance::Normal,
            self_destruct_date: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn color(&self) -> i32 {
        self.color
    }

    /// Color as an unsigned `0xAARRGGBB` value.
    pub fn color_argb(&self) -> u32 {
        self.color as u32
    }

    pub fn importance(&self) -> Importance {
        self.importance
    }

    /// `None` means the note never expires.
    pub fn self_destruct_date(&self) -> Option<NaiveDate> {
        self.self_destruct_date
    }

    pub fn has_default_color(&self) -> bool {
        self.color == DEFAULT_NOTE_COLOR
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self
        }
    }

    pub fn with_color(self, color: i32) -> Self {
        Self { color, ..self }
    }

    pub fn with_importance(self, importance: Importance) -> Self {
        Self { importance, ..self }
    }

    pub fn with_self_destruct_date(self, self_destruct_date: Option<NaiveDate>) -> Self {
        Self {
            self_destruct_date,
            ..self
        }
    }
}

/// Generates a new random uid in canonical hyphenated UUID form.
pub fn generate_uid() -> NoteUid {
    Uuid::new_v4().to_string()
}
