//! Note record codec.
//!
//! # Responsibility
//! - Convert `Note` values to and from compact JSON records.
//! - Own the one-record-per-line form used by the local notes file and the
//!   record form sent over the remote transport.
//!
//! # Invariants
//! - Only `uid`, `title`, `content`, `color`, `importance` are ever written.
//! - Default-valued `color` and `importance` are omitted.
//! - Decoding never panics and never returns an error; failures are `None`.

mod note_codec;

pub use note_codec::{decode, decode_line, encode, encode_line};
