//! Front-matter parsing
//!
//! A source document may open with a YAML block fenced by two `---` lines:
//!
//! ```text
//! ---
//! title: Hello World
//! date: 2024-01-15
//! tags: [rust, blog]
//! ---
//!
//! Body markdown...
//! ```

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::MetadataError;
use crate::helpers::parse_date;

/// Line that opens and closes the metadata block
pub const MARKER: &str = "---";

/// Visitor turning any YAML scalar into a string (`title: 1984` is a title, not an error)
struct ScalarString;

impl<'de> serde::de::Visitor<'de> for ScalarString {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number or boolean")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value))
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value.to_string()))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value.to_string()))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value.to_string()))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(value.to_string()))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarString)
}

/// A single list item; scalars only
struct Item(String);

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match deserializer.deserialize_any(ScalarString)? {
            Some(value) => Ok(Item(value)),
            None => Err(serde::de::Error::custom("empty list item")),
        }
    }
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(Item(item)) = seq.next_element::<Item>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "optional_scalar")]
    pub date: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub description: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub url: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub author: Option<String>,

    /// Keys the post model does not know about
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string.
    /// Returns (front_matter, body). A document without a complete block
    /// yields empty front-matter and the whole text as body.
    pub fn parse(content: &str) -> Result<(Self, &str), MetadataError> {
        let Some((payload, body)) = split_block(content) else {
            return Ok((FrontMatter::default(), content));
        };

        if payload.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm: FrontMatter = serde_yaml::from_str(payload)?;
        fm.parse_date()?;

        Ok((fm, body))
    }

    /// Parse the date field, if present
    pub fn parse_date(&self) -> Result<Option<NaiveDate>, MetadataError> {
        match &self.date {
            None => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .ok_or_else(|| MetadataError::InvalidDate(raw.clone())),
        }
    }
}

/// Split `content` into (payload, body) around the first two marker lines.
/// The opening marker has to be the first non-blank line.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    let mut payload_start = None;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let is_marker = line.trim() == MARKER;

        match payload_start {
            None if line.trim().is_empty() => continue,
            None if is_marker => payload_start = Some(offset),
            None => return None,
            Some(start) if is_marker => {
                return Some((&content[start..line_start], &content[offset..]));
            }
            Some(_) => {}
        }
    }

    None
}
