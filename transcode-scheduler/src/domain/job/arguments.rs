//! Extra transcoder arguments attached to a job.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered string map parsed from `k=v,k=v`.
///
/// Serialized as a JSON object whose key order follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobArguments(Vec<(String, String)>);

impl JobArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-delimited `key=value` list.
    ///
    /// Segments are trimmed and empty ones skipped. A segment without `=`
    /// maps its key to an empty value. A repeated key overwrites in place.
    pub fn parse(raw: &str) -> Self {
        let mut arguments = Self::new();
        for segment in raw.split(',').map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            let key = key.trim();
            if !key.is_empty() {
                arguments.insert(key, value.trim());
            }
        }
        arguments
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode for the `arguments` column.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from the `arguments` column.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JobArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut arguments = Self::new();
        for (k, v) in iter {
            arguments.insert(k, v);
        }
        arguments
    }
}

impl Serialize for JobArguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for JobArguments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArgumentsVisitor;

        impl<'de> Visitor<'de> for ArgumentsVisitor {
            type Value = JobArguments;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string arguments")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut arguments = JobArguments::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    arguments.insert(k, v);
                }
                Ok(arguments)
            }
        }

        deserializer.deserialize_map(ArgumentsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let arguments = JobArguments::parse("a=b,c=d");
        assert_eq!(arguments, JobArguments::from_iter([("a", "b"), ("c", "d")]));
    }

    #[test]
    fn test_parse_edge_cases() {
        let arguments = JobArguments::parse(" a = b ,, flag , =x, c=d=e ");
        assert_eq!(arguments.get("a"), Some("b"));
        assert_eq!(arguments.get("flag"), Some(""));
        assert_eq!(arguments.get("c"), Some("d=e"));
        assert_eq!(arguments.len(), 3);
    }

    #[test]
    fn test_parse_empty() {
        assert!(JobArguments::parse("").is_empty());
    }

    #[test]
    fn test_repeated_key_keeps_position() {
        let arguments = JobArguments::parse("a=1,b=2,a=3");
        let pairs: Vec<_> = arguments.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_json_preserves_order() {
        let arguments = JobArguments::parse("z=1,a=2");
        let json = arguments.to_json().unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
        assert_eq!(JobArguments::from_json(&json).unwrap(), arguments);
    }
}
