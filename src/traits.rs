use anyhow::Result;

pub trait DbTable {
    const TABLE_NAME: &'static str;
}

pub trait CreateTable: DbTable {
    async fn create_table(conn: &sqlx::SqlitePool) -> Result<()>;
}
