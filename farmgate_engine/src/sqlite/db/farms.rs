use sqlx::SqliteConnection;

use crate::{db_types::Farm, traits::SettlementError};

pub async fn fetch_farm(id: i64, conn: &mut SqliteConnection) -> Result<Option<Farm>, SettlementError> {
    let farm = sqlx::query_as("SELECT * FROM farms WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(farm)
}
