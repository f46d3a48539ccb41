use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field labels emitted by the upstream text API.
pub mod labels {
    pub const CITY: &str = "城市名";
    pub const WEATHER: &str = "实时天气";
    pub const TEMPERATURE: &str = "实时气温";
    pub const UPDATED_AT: &str = "更新时间";
    pub const DETAIL_LOCATION: &str = "详细地名";
}

/// City name pulled out of a chat message, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    city: String,
}

impl QueryRequest {
    /// Returns `None` when nothing but whitespace is left.
    pub fn new(city: impl Into<String>) -> Option<Self> {
        let city = city.into();
        let trimmed = city.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self { city: trimmed.to_string() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// Successful upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWeather {
    pub body: String,
    pub status: u16,
}

/// Key/value pairs recovered from the upstream text.
///
/// No schema is enforced here; the formatter only reads the keys it knows in
/// [`labels`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherFields(BTreeMap<String, String>);

impl WeatherFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Overwrites any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for WeatherFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::default();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}
