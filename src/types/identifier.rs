use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

use crate::error::ResolveError;

/// Class of an Open Library identifier, taken from its suffix letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OlClass {
    /// `OL<digits>W`, the abstract book
    Work,
    /// `OL<digits>M`, one published instance of a work
    Edition,
}

/// A validated Open Library identifier such as `OL45804W` or `OL7353617M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OlId {
    raw:   String,
    class: OlClass,
}

impl OlId {
    pub fn class(&self) -> OlClass {
        self.class
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_work(&self) -> bool {
        self.class == OlClass::Work
    }

    /// Parses the last path segment of an upstream key like `/works/OL45804W`.
    pub fn from_key(key: &str) -> Option<Self> {
        key.rsplit('/').next().and_then(|x| x.parse().ok())
    }
}

impl FromStr for OlId {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolveError::InvalidIdentifier(s.to_string());
        let body = s.strip_prefix("OL").ok_or_else(invalid)?;
        let (digits, class) = match body.as_bytes().last() {
            Some(b'W') => (&body[..body.len() - 1], OlClass::Work),
            Some(b'M') => (&body[..body.len() - 1], OlClass::Edition),
            _ => return Err(invalid()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Self {
            raw: s.to_string(),
            class,
        })
    }
}

impl Display for OlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for OlId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for OlId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl sqlx::Type<sqlx::Sqlite> for OlId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for OlId {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Text(
            std::borrow::Cow::Owned(self.raw.clone()),
        ));

        sqlx::encode::IsNull::No
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for OlId
where
    &'r str: sqlx::Decode<'r, DB>,
{
    fn decode(
        value: <DB as sqlx::database::HasValueRef<'r>>::ValueRef,
    ) -> Result<Self, Box<dyn std::error::Error + 'static + Send + Sync>> {
        let value = <&str as sqlx::Decode<DB>>::decode(value)?;
        Ok(value.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_work_and_edition_shapes() {
        let work: OlId = "OL45804W".parse().unwrap();
        assert_eq!(work.class(), OlClass::Work);
        let edition: OlId = "OL7353617M".parse().unwrap();
        assert_eq!(edition.class(), OlClass::Edition);
        assert_eq!(edition.to_string(), "OL7353617M");
    }

    #[test]
    fn rejects_other_shapes() {
        for s in [
            "", "OL", "OLW", "OLM", "OL123", "OL123A", "ol123W", "OL12x3W", " OL123W", "OL123W ",
            "/works/OL123W", "123W", "OL-1W",
        ] {
            assert!(
                matches!(s.parse::<OlId>(), Err(ResolveError::InvalidIdentifier(_))),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_key_takes_last_segment() {
        assert_eq!(
            OlId::from_key("/works/OL27448W").map(|x| x.to_string()),
            Some("OL27448W".to_string())
        );
        assert_eq!(OlId::from_key("/authors/OL26320A"), None);
    }
}
