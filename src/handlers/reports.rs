// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::reports::{Dashboard, FinancialReport, ReportPeriod},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinancialReportQuery {
    /// day | week | month | all (padrão: month)
    #[serde(default)]
    pub period: ReportPeriod,
}

// GET /api/reports/financial
#[utoipa::path(
    get,
    path = "/api/reports/financial",
    tag = "Relatórios",
    params(FinancialReportQuery),
    responses(
        (status = 200, description = "Faturamento, despesas, folha e lucro do período", body = FinancialReport)
    )
)]
pub async fn financial_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<FinancialReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .financial_report(&app_state.db_pool, query.period)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/dashboard
#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    tag = "Relatórios",
    responses(
        (status = 200, description = "Indicadores do painel e últimos pedidos", body = Dashboard)
    )
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = app_state
        .report_service
        .dashboard(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(dashboard)))
}
