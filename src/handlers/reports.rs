use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::LedgerError;
use crate::export::ExportFormat;
use crate::services::ReportQuery;
use crate::AppState;

/// Optional report filters. An empty body means no filters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub operation_type: Option<String>,
}

pub async fn report(
    Path((wallet_id, format)): Path<(String, String)>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, LedgerError> {
    let request: ReportRequest = if body.is_empty() {
        ReportRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| LedgerError::InvalidRequest(format!("decode request: {}", e)))?
    };
    let format: ExportFormat = format.parse()?;

    let query = ReportQuery {
        wallet_id,
        operation_type: request.operation_type,
        from_date: request.from_date,
        to_date: request.to_date,
    };
    let data = state.reports.export(&query, format).await?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], data).into_response())
}
