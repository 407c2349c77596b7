use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Stored as milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub chrono::DateTime<chrono::Utc>);

impl Timestamp {
    pub fn now() -> Self {
        // Millisecond precision so values survive a round trip through the database
        let now = chrono::Utc::now().timestamp_millis();
        Self::from_millis(now).unwrap_or(Self(chrono::Utc::now()))
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        chrono::NaiveDateTime::from_timestamp_millis(millis)
            .map(|x| Self(chrono::DateTime::from_utc(x, chrono::Utc)))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y/%m/%d %H:%M"))
    }
}

impl sqlx::Type<sqlx::Sqlite> for Timestamp {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Timestamp {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Int64(
            self.0.timestamp_millis(),
        ));

        sqlx::encode::IsNull::No
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for Timestamp
where
    i64: sqlx::Decode<'r, DB>,
{
    fn decode(
        value: <DB as sqlx::database::HasValueRef<'r>>::ValueRef,
    ) -> Result<Self, Box<dyn std::error::Error + 'static + Send + Sync>> {
        let value = <i64 as sqlx::Decode<DB>>::decode(value)?;
        Self::from_millis(value).ok_or_else(|| format!("timestamp out of range: {value}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlx::{Sqlite, Type};

    #[test]
    fn decodes_from_integer_columns() {
        assert!(<Timestamp as Type<Sqlite>>::compatible(&<i64 as Type<Sqlite>>::type_info()));
        assert!(<Timestamp as Type<Sqlite>>::compatible(&<i32 as Type<Sqlite>>::type_info()));
    }

    #[tokio::test]
    async fn survives_a_database_round_trip() {
        let conn = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE t (at INTEGER NOT NULL)")
            .execute(&conn)
            .await
            .unwrap();
        let now = Timestamp::now();
        sqlx::query("INSERT INTO t (at) VALUES (?1)")
            .bind(now)
            .execute(&conn)
            .await
            .unwrap();
        let read: Timestamp = sqlx::query_scalar("SELECT at FROM t")
            .fetch_one(&conn)
            .await
            .unwrap();
        assert_eq!(read, now);
    }
}
