use shared::{
    domain::Taxpayer,
    error::{ApiError, ErrorCode},
};
use storage::{InsertOutcome, Storage};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_taxpayers(ctx: &ApiContext) -> Result<Vec<Taxpayer>, ApiError> {
    let stored = ctx.storage.list_taxpayers().await.map_err(internal)?;
    Ok(stored.into_iter().map(|row| row.record).collect())
}

/// Validates and registers a new taxpayer. Fields are trimmed before insert;
/// the stored form is canonical, which is one reason clients must re-fetch
/// after a successful add rather than append locally.
pub async fn add_taxpayer(ctx: &ApiContext, record: Taxpayer) -> Result<(), ApiError> {
    record
        .validate()
        .map_err(|err| ApiError::new(ErrorCode::Validation, err.to_string()))?;

    let record = record.trimmed();
    let outcome = ctx
        .storage
        .insert_taxpayer(&record)
        .await
        .map_err(internal)?;
    match outcome {
        InsertOutcome::Inserted => {
            info!(tid = %record.tid, "taxpayer registered");
            Ok(())
        }
        InsertOutcome::DuplicateTid => Err(ApiError::new(
            ErrorCode::Duplicate,
            format!("tid '{}' is already registered", record.tid),
        )),
    }
}

pub async fn find_taxpayer_by_tid(
    ctx: &ApiContext,
    tid: &str,
) -> Result<Option<Taxpayer>, ApiError> {
    if tid.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "tid must not be empty"));
    }
    let stored = ctx
        .storage
        .find_taxpayer_by_tid(tid.trim())
        .await
        .map_err(internal)?;
    Ok(stored.map(|row| row.record))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
