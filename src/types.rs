use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::SearchError;

/// A single postal code / place match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// `"<zipcode>-<name>"`, stable enough to key suggestion lists
    pub id: String,
    pub name: String,
    /// Kept as text, postal codes are not numbers everywhere
    pub zipcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canton: Option<String>,
}

impl Location {
    pub fn new(
        zipcode: impl Into<String>,
        name: impl Into<String>,
        canton: Option<String>,
    ) -> Self {
        let zipcode = zipcode.into();
        let name = name.into();
        Self {
            id: format!("{}-{}", zipcode, name),
            name,
            zipcode,
            canton: canton.filter(|c| !c.is_empty()),
        }
    }
}

/// Search mode sent to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Zip,
    Locality,
}

impl SearchType {
    /// A query is a postal-code query iff it is one or more ASCII digits
    pub fn classify(query: &str) -> Self {
        if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
            Self::Zip
        } else {
            Self::Locality
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Locality => "locality",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets sent to a provider for one cache miss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityQuery {
    pub text: String,
    pub kind: SearchType,
}

impl LocalityQuery {
    /// Build from an already trimmed query
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = SearchType::classify(&text);
        Self { text, kind }
    }
}

/// Response body of the localities search endpoint
#[derive(Debug, Deserialize)]
pub struct LocalitiesResponse {
    #[serde(default)]
    pub localities: Option<Vec<LocalityEntry>>,
}

/// Postal codes come back as strings, but some payloads carry bare numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ZipValue {
    Text(String),
    Number(u64),
}

impl ZipValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalityEntry {
    #[serde(default)]
    pub zip: Option<ZipValue>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub canton: Option<String>,
}

/// Canton is cosmetic: a value of the wrong type is dropped, not fatal
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

impl LocalityEntry {
    /// Returns `None` unless both postal code and name are present and non-empty
    pub fn into_location(self) -> Option<Location> {
        let zipcode = self
            .zip
            .map(ZipValue::into_string)
            .filter(|z| !z.is_empty())?;
        let name = self.name.filter(|n| !n.is_empty())?;
        Some(Location::new(zipcode, name, self.canton))
    }
}

/// Validate a provider body and turn it into locations, keeping provider order.
pub fn parse_localities(body: &str) -> Result<Vec<Location>, SearchError> {
    let response: LocalitiesResponse = serde_json::from_str(body)?;
    let entries = response.localities.ok_or(SearchError::MissingLocalities)?;

    Ok(entries
        .into_iter()
        .filter_map(LocalityEntry::into_location)
        .collect())
}
