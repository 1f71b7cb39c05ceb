use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Match identifier as the aggregator actually sends it: sometimes a JSON
/// number, sometimes a string, sometimes missing entirely.
///
/// Identifiers are canonicalized at ingestion: a string that parses as an
/// integer becomes `Number`, so `1` and `"1"` land in the same equivalence
/// class and set membership works across endpoints that disagree on the
/// type. A known edge remains when distinct spellings collapse to the same
/// integer (`"01"` vs `"1"`); the upstream data has never shown this, and we
/// deliberately do not guess which spelling is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchId {
    Number(i64),
    Text(String),
    Missing,
}

impl Default for MatchId {
    fn default() -> Self {
        MatchId::Missing
    }
}

impl MatchId {
    /// Canonicalize a raw string the same way deserialization does.
    /// Empty input counts as missing.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            return MatchId::Missing;
        }
        match s.parse::<i64>() {
            Ok(n) => MatchId::Number(n),
            Err(_) => MatchId::Text(s.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MatchId::Missing)
    }

    /// Canonical string form, used for watch URLs. `None` when missing.
    pub fn canonical(&self) -> Option<String> {
        match self {
            MatchId::Number(n) => Some(n.to_string()),
            MatchId::Text(s) => Some(s.clone()),
            MatchId::Missing => None,
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchId::Number(n) => write!(f, "{}", n),
            MatchId::Text(s) => write!(f, "{}", s),
            MatchId::Missing => write!(f, "(missing)"),
        }
    }
}

impl From<i64> for MatchId {
    fn from(n: i64) -> Self {
        MatchId::Number(n)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId::from_text(s)
    }
}

impl Serialize for MatchId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MatchId::Number(n) => serializer.serialize_i64(*n),
            MatchId::Text(s) => serializer.serialize_str(s),
            MatchId::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MatchId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct MatchIdVisitor;

        impl<'de> Visitor<'de> for MatchIdVisitor {
            type Value = MatchId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, string, or null")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(MatchId::Number(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(MatchId::Number(v as i64))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(MatchId::from_text(v))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(MatchId::Missing)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(MatchId::Missing)
            }
        }

        deserializer.deserialize_any(MatchIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_deserializes() {
        let id: MatchId = serde_json::from_str("123").unwrap();
        assert_eq!(id, MatchId::Number(123));
    }

    #[test]
    fn string_deserializes() {
        let id: MatchId = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(id, MatchId::Text("abc123".to_string()));
    }

    #[test]
    fn numeric_string_canonicalizes_to_number() {
        let id: MatchId = serde_json::from_str(r#""456""#).unwrap();
        assert_eq!(id, MatchId::Number(456));
        assert_eq!(id, MatchId::from(456));
    }

    #[test]
    fn null_deserializes_to_missing() {
        let id: MatchId = serde_json::from_str("null").unwrap();
        assert!(id.is_missing());
        assert_eq!(id.canonical(), None);
    }

    #[test]
    fn empty_text_counts_as_missing() {
        assert!(MatchId::from_text("").is_missing());
    }

    #[test]
    fn cross_type_equality_via_canonicalization() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(MatchId::from(1));
        assert!(set.contains(&MatchId::from_text("1")));
        assert!(!set.contains(&MatchId::from_text("2")));
    }
}
