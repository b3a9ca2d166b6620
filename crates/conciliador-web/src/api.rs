use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use conciliador::normalize::clean_amount;
use conciliador::{Decimal, ReconciliationResult, Source, Transaction};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

#[derive(Serialize)]
pub struct ResultResponse {
    #[serde(flatten)]
    pub result: ReconciliationResult,
    pub difference: Decimal,
    pub fully_reconciled: bool,
}

impl From<ReconciliationResult> for ResultResponse {
    fn from(result: ReconciliationResult) -> Self {
        ResultResponse {
            difference: result.difference(),
            fully_reconciled: result.is_fully_reconciled(),
            result,
        }
    }
}

/// Amounts may be sent as JSON numbers or as text like `"$1,200.00"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SerializedAmount {
    Text(String),
    Number(Decimal),
}

#[derive(Debug, Deserialize)]
pub struct SerializedTransaction {
    pub date: String,
    pub name: String,
    #[serde(default)]
    pub id: String,
    pub amount: SerializedAmount,
    #[serde(default)]
    pub original_line: String,
}

impl SerializedTransaction {
    fn into_transaction(self, source: Source) -> Transaction {
        let amount = match self.amount {
            SerializedAmount::Text(text) => clean_amount(&text),
            SerializedAmount::Number(number) => number,
        };
        Transaction::new(source, self.date, self.name, self.id, amount)
            .with_original_line(self.original_line)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub internal: Vec<SerializedTransaction>,
    pub bank: Vec<SerializedTransaction>,
}

pub async fn get_result(State(state): State<AppState>) -> Json<ResultResponse> {
    let result = state.lock().result.clone();
    Json(result.into())
}

pub async fn export_report(State(state): State<AppState>) -> Result<Response, Response> {
    let result = state.lock().result.clone();

    let report = conciliador::export::report_csv(&result).map_err(|e| {
        tracing::error!("Failed to export report: {}", e);
        ErrorResponse {
            error: format!("Failed to export: {}", e),
        }
        .into_response()
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"conciliacion.csv\"",
            ),
        ],
        report,
    )
        .into_response())
}

pub async fn reconcile_lists(
    State(state): State<AppState>,
    payload: Result<Json<ReconcileRequest>, JsonRejection>,
) -> Result<Json<ResultResponse>, ErrorResponse> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!("Rejected reconcile request: {}", rejection.body_text());
        ErrorResponse {
            error: format!("Invalid request: {}", rejection.body_text()),
        }
    })?;

    let config = state.lock().config.clone();

    let internal: Vec<_> = payload
        .internal
        .into_iter()
        .map(|t| t.into_transaction(Source::Internal))
        .collect();
    let bank: Vec<_> = payload
        .bank
        .into_iter()
        .map(|t| t.into_transaction(Source::Bank))
        .collect();

    tracing::info!(
        "Reconciling {} internal and {} bank transactions on request",
        internal.len(),
        bank.len()
    );
    Ok(Json(config.reconcile(&internal, &bank).into()))
}

pub async fn file_changes_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscriber_count = state.file_change_tx.receiver_count();
    tracing::info!("New SSE connection. Total subscribers: {subscriber_count}");

    let rx = state.file_change_tx.subscribe();
    let stream = BroadcastStream::new(rx).map(|_| Ok(Event::default().data("reload")));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
