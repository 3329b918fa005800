use crate::model::note::{generate_uid, Importance, Note, DEFAULT_NOTE_COLOR};
use serde::Serialize;
use serde_json::Value;

const KEY_UID: &str = "uid";
const KEY_TITLE: &str = "title";
const KEY_CONTENT: &str = "content";
const KEY_COLOR: &str = "color";
const KEY_IMPORTANCE: &str = "importance";

/// Borrowed wire shape. Field order is the key order on disk.
#[derive(Serialize)]
struct NoteRecord<'a> {
    uid: &'a str,
    title: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    importance: Option<&'static str>,
}

impl<'a> From<&'a Note> for NoteRecord<'a> {
    fn from(note: &'a Note) -> Self {
        Self {
            uid: note.uid(),
            title: note.title(),
            content: note.content(),
            color: (!note.has_default_color()).then(|| note.color()),
            importance: (note.importance() != Importance::Normal)
                .then(|| note.importance().as_str()),
        }
    }
}

/// Encodes a note into a JSON object.
pub fn encode(note: &Note) -> Result<Value, serde_json::Error> {
    serde_json::to_value(NoteRecord::from(note))
}

/// Encodes a note as one compact JSON line (no trailing newline).
///
/// String fields are escaped, so the result never contains a raw newline.
pub fn encode_line(note: &Note) -> Result<String, serde_json::Error> {
    serde_json::to_string(&NoteRecord::from(note))
}

/// Decodes a JSON object into a note.
///
/// Rules:
/// - `uid`: string is kept; absent or `null` gets a fresh uid; any other
///   type rejects the record.
/// - `title`, `content`: required strings.
/// - `color`: integers keep their low 32 bits; fractional numbers and numeric
///   strings truncate toward zero, saturating at the `i32` bounds; anything
///   else falls back to opaque white.
/// - `importance`: `LOW|NORMAL|HIGH`; anything else falls back to `NORMAL`.
pub fn decode(record: &Value) -> Option<Note> {
    let object = record.as_object()?;

    let uid = match object.get(KEY_UID) {
        None | Some(Value::Null) => generate_uid(),
        Some(Value::String(uid)) => uid.clone(),
        Some(_) => return None,
    };
    let title = object.get(KEY_TITLE)?.as_str()?;
    let content = object.get(KEY_CONTENT)?.as_str()?;
    let color = object
        .get(KEY_COLOR)
        .and_then(color_from_value)
        .unwrap_or(DEFAULT_NOTE_COLOR);
    let importance = object
        .get(KEY_IMPORTANCE)
        .and_then(Value::as_str)
        .and_then(Importance::from_name)
        .unwrap_or_default();

    Some(
        Note::with_uid(uid, title, content)
            .with_color(color)
            .with_importance(importance),
    )
}

/// Parses one line of text and decodes it. Malformed JSON yields `None`.
pub fn decode_line(line: &str) -> Option<Note> {
    let value: Value = serde_json::from_str(line).ok()?;
    decode(&value)
}

fn color_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => {
            if let Some(raw) = number.as_i64() {
                // Low 32 bits: unsigned ARGB like 0xFFFF0000 maps to its signed form.
                Some(raw as i32)
            } else {
                number.as_f64().map(|raw| raw as i32)
            }
        }
        Value::String(text) => text.trim().parse::<f64>().ok().map(|raw| raw as i32),
        _ => None,
    }
}
