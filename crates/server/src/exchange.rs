//! Spreadsheet export and import endpoints.

use api_types::exchange::{ExportQuery, ImportReport};
use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{ExportFilter, SheetFormat, User};

use crate::{ServerError, params, server::ServerState};

pub async fn export(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let format = match query.format.as_deref().map(str::trim) {
        None | Some("") => SheetFormat::default(),
        Some(value) => value.parse::<SheetFormat>()?,
    };
    let filter = ExportFilter {
        wallet_id: params::wallet_filter(query.wallet_id.as_deref())?,
        month: params::month_filter(query.month.as_deref())?,
        year: params::year_filter(query.year.as_deref())?,
    };

    let bytes = state
        .engine
        .export_transactions(user.id, &filter, format)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", format.file_name()),
        ),
    ];
    Ok((headers, bytes))
}

/// Accepts a multipart upload with a `file` field (`.csv` or `.xlsx`).
///
/// Answers 400 with the report when not a single row could be imported.
pub async fn import(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportReport>), ServerError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::Generic(format!("invalid upload: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ServerError::Generic(format!("invalid upload: {err}")))?;
        upload = Some((file_name, bytes));
        break;
    }
    let Some((file_name, bytes)) = upload else {
        return Err(ServerError::Generic("no file uploaded".to_string()));
    };

    let format = SheetFormat::from_file_name(&file_name)?;
    let report = state
        .engine
        .import_transactions(user.id, &bytes, format)
        .await?;
    tracing::info!(
        "import for {}: {} rows imported, {} errors",
        user.email,
        report.imported,
        report.errors.len()
    );

    let status = if report.imported == 0 {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ImportReport {
            success: report.success,
            imported: report.imported,
            errors: report.errors,
        }),
    ))
}
