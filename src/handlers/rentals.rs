// src/handlers/rentals.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::required,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::rentals::{Rental, RentalDetail, RentalStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentalPayload {
    #[validate(required(message = "Selecione a chopeira."))]
    pub asset_id: Option<Uuid>,

    #[validate(required(message = "Selecione o cliente."))]
    pub customer_id: Option<Uuid>,

    #[validate(required(message = "Informe a data prevista de devolução."))]
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub expected_return_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRentalsQuery {
    pub status: Option<RentalStatus>,
}

// GET /api/rentals
#[utoipa::path(
    get,
    path = "/api/rentals",
    tag = "Locações",
    params(ListRentalsQuery),
    responses(
        (status = 200, description = "Locações com cliente, chopeira e atraso", body = Vec<RentalDetail>)
    )
)]
pub async fn list_rentals(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListRentalsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rentals = app_state
        .rental_service
        .list_rentals(&app_state.db_pool, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rentals)))
}

// POST /api/rentals
#[utoipa::path(
    post,
    path = "/api/rentals",
    tag = "Locações",
    request_body = CreateRentalPayload,
    responses(
        (status = 201, description = "Chopeira locada", body = Rental),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Chopeira ou cliente não encontrado"),
        (status = 409, description = "Chopeira não está disponível")
    )
)]
pub async fn create_rental(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateRentalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let asset_id = required(payload.asset_id, "assetId", "Selecione a chopeira.").map_err(to_api)?;
    let customer_id = required(payload.customer_id, "customerId", "Selecione o cliente.").map_err(to_api)?;
    let expected_return_date = required(
        payload.expected_return_date,
        "expectedReturnDate",
        "Informe a data prevista de devolução.",
    )
    .map_err(to_api)?;

    let rental = app_state
        .rental_service
        .create_rental(&app_state.db_pool, asset_id, customer_id, expected_return_date)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::CREATED, Json(rental)))
}

// POST /api/rentals/{id}/return
#[utoipa::path(
    post,
    path = "/api/rentals/{id}/return",
    tag = "Locações",
    params(("id" = Uuid, Path, description = "ID da locação")),
    responses(
        (status = 200, description = "Chopeira devolvida e liberada", body = Rental),
        (status = 404, description = "Locação não encontrada"),
        (status = 409, description = "Locação já devolvida")
    )
)]
pub async fn return_rental(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rental = app_state
        .rental_service
        .return_rental(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rental)))
}
