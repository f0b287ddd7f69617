use axum::{Json, extract::State};
use redb::ReadableDatabase;
use serde_json::{Value, json};

use crate::AppState;
use crate::db::tables;
use crate::error::AppError;

/// GET /health
///
/// Reports `connected` when a read snapshot can open both the post and
/// vote tables.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.clone();
    let db_status = tokio::task::spawn_blocking(move || {
        let check = db.begin_read().map_err(AppError::from).and_then(|txn| {
            txn.open_table(tables::POSTS)?;
            txn.open_table(tables::VOTES)?;
            Ok(())
        });
        match check {
            Ok(()) => "connected",
            Err(e) => {
                tracing::error!("Ledger store unreadable: {}", e);
                "disconnected"
            }
        }
    })
    .await
    .unwrap_or("error");

    Json(json!({
        "status": if db_status == "connected" { "healthy" } else { "unhealthy" },
        "database": db_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
