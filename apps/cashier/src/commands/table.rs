//! # Table Commands
//!
//! Floor overview and table administration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::{DiningTable, TableOverview};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableArgs {
    pub number: i64,
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTableArgs {
    pub table_id: String,
    pub number: i64,
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityArgs {
    pub table_id: String,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableIdArgs {
    pub table_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

/// Every table with its current order, ordered by number.
pub async fn list_tables(state: &AppState) -> Result<Vec<TableOverview>, ApiError> {
    debug!("list_tables command");
    Ok(state.database().tables().list().await?)
}

pub async fn create_table(
    state: &AppState,
    args: CreateTableArgs,
) -> Result<DiningTable, ApiError> {
    debug!(number = args.number, name = %args.name, "create_table command");
    Ok(state
        .database()
        .tables()
        .create(args.number, &args.name, args.capacity)
        .await?)
}

pub async fn update_table(
    state: &AppState,
    args: UpdateTableArgs,
) -> Result<DiningTable, ApiError> {
    debug!(table_id = %args.table_id, "update_table command");
    Ok(state
        .database()
        .tables()
        .update(&args.table_id, args.number, &args.name, args.capacity)
        .await?)
}

/// Administrative flip; refused while the table hosts an active order.
pub async fn set_table_availability(
    state: &AppState,
    args: SetAvailabilityArgs,
) -> Result<DiningTable, ApiError> {
    debug!(table_id = %args.table_id, available = args.available, "set_table_availability command");
    Ok(state
        .database()
        .tables()
        .set_availability(&args.table_id, args.available)
        .await?)
}

/// Deletes a free table together with its order history.
pub async fn delete_table(
    state: &AppState,
    args: TableIdArgs,
) -> Result<DeletedResponse, ApiError> {
    debug!(table_id = %args.table_id, "delete_table command");
    state.database().tables().delete(&args.table_id).await?;
    Ok(DeletedResponse {
        deleted: args.table_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::cafe;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_table_admin_round() {
        let (state, table_id, _) = cafe().await;

        let created = create_table(
            &state,
            CreateTableArgs {
                number: 2,
                name: "Teras".into(),
                capacity: 6,
            },
        )
        .await
        .unwrap();
        assert!(created.is_available);

        let dup = create_table(
            &state,
            CreateTableArgs {
                number: 2,
                name: "Teras 2".into(),
                capacity: 2,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(dup.code, ErrorCode::Conflict);

        let renamed = update_table(
            &state,
            UpdateTableArgs {
                table_id: table_id.clone(),
                number: 1,
                name: "Jendela".into(),
                capacity: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Jendela");

        let deleted = delete_table(&state, TableIdArgs { table_id: created.id }).await.unwrap();
        assert!(!deleted.deleted.is_empty());
        assert_eq!(list_tables(&state).await.unwrap().len(), 1);
    }
}
