//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical record stored per primary key.
//! - Decode client payloads leniently (type coercion only, no validation).
//!
//! # Invariants
//! - `id` is client-supplied and never generated by the service.
//! - Encoding always emits `id` and `year` as JSON numbers.
//! - Decoding never rejects a missing or `null` field; it falls back to
//!   `0` for integers and `""` for strings.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

/// Primary key of a book. Chosen by the client.
pub type BookId = i32;

/// One catalogue record.
///
/// Field names are the JSON wire names and the `book_table` column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, deserialize_with = "lenient_i32")]
    pub id: BookId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub publisher: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub year: i32,
    #[serde(default, deserialize_with = "nullable_string")]
    pub genre: String,
}

impl Book {
    /// Builds a record from all six fields.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
        year: i32,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            publisher: publisher.into(),
            year,
            genre: genre.into(),
        }
    }

    /// Overwrites every descriptive field from `details`, keeping `self.id`.
    pub fn apply_details(&mut self, details: Book) {
        self.title = details.title;
        self.author = details.author;
        self.publisher = details.publisher;
        self.year = details.year;
        self.genre = details.genre;
    }
}

// Accepts a JSON number or base-10 text; empty text and null read as 0.
// Fractions are truncated toward zero.
fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientI32Visitor)
}

struct LenientI32Visitor;

impl<'de> Visitor<'de> for LenientI32Visitor {
    type Value = i32;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number within 32-bit integer range, a numeric string, or null")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i32, E> {
        i32::try_from(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i32, E> {
        i32::try_from(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i32, E> {
        let truncated = value.trunc();
        if truncated.is_finite()
            && truncated >= f64::from(i32::MIN)
            && truncated <= f64::from(i32::MAX)
        {
            Ok(truncated as i32)
        } else {
            Err(E::invalid_value(de::Unexpected::Float(value), &self))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i32, E> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse::<i32>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<i32, E> {
        Ok(0)
    }

    fn visit_none<E: de::Error>(self) -> Result<i32, E> {
        Ok(0)
    }
}

// Scalars are kept as their text form; null reads as "".
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarStringVisitor)
}

struct ScalarStringVisitor;

impl<'de> Visitor<'de> for ScalarStringVisitor {
    type Value = String;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean, or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}
