use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro de domínio. Os handlers convertem para ApiError (já traduzido).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Carrinho vazio")]
    EmptyCart,

    #[error("Equipamento não está disponível")]
    AssetNotAvailable,

    #[error("Equipamento locado")]
    AssetRented,

    #[error("Status do equipamento controlado pelas locações")]
    AssetStatusLocked,

    #[error("Locação não está ativa")]
    RentalNotActive,

    #[error("Pedido não está em consignação")]
    OrderNotInConsignment,

    #[error("Transição de status inválida")]
    InvalidOrderTransition,

    #[error("Registro referenciado por outros dados")]
    ForeignKeyViolation,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte o erro do sqlx olhando o código do Postgres (FK = 23503).
    pub fn from_db(e: sqlx::Error, entity: &str) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::ResourceNotFound(entity.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::ForeignKeyViolation
            }
            _ => AppError::DatabaseError(e),
        }
    }

    /// Chave usada no catálogo de mensagens (locales/*.json).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::ResourceNotFound(_) => "resource_not_found",
            AppError::EmptyCart => "empty_cart",
            AppError::AssetNotAvailable => "asset_not_available",
            AppError::AssetRented => "asset_rented",
            AppError::AssetStatusLocked => "asset_status_locked",
            AppError::RentalNotActive => "rental_not_active",
            AppError::OrderNotInConsignment => "order_not_in_consignment",
            AppError::InvalidOrderTransition => "invalid_order_transition",
            AppError::ForeignKeyViolation => "foreign_key_violation",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::EmptyCart => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AssetNotAvailable
            | AppError::AssetRented
            | AppError::AssetStatusLocked
            | AppError::RentalNotActive
            | AppError::OrderNotInConsignment
            | AppError::InvalidOrderTransition
            | AppError::ForeignKeyViolation => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log; o cliente recebe só a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let mut message = i18n.message(&locale.0, self.code());
        if let AppError::ResourceNotFound(entity) = self {
            message = message.replace("{entity}", entity);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                collect_field_messages("", errors, &mut details);
                Some(details)
            }
            _ => None,
        };

        ApiError { status, message, details }
    }
}

// Achata os erros aninhados em "campo", "sub.campo" e "lista[0].campo"
fn collect_field_messages(prefix: &str, errors: &ValidationErrors, out: &mut HashMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        // Erros de struct inteira ("__all__") ficam no nome do próprio struct
        let name: &str = field;
        let path = match (name, prefix.is_empty()) {
            ("__all__", true) => name.to_string(),
            ("__all__", false) => prefix.to_string(),
            (_, true) => json_field_name(name),
            (_, false) => format!("{prefix}.{}", json_field_name(name)),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.entry(path).or_default().extend(field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_field_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

// Os detalhes usam o mesmo nome do campo no JSON (camelCase)
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = !name.is_empty();
        } else if upper_next {
            name.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            name.push(ch);
        }
    }
    name
}

// O erro que sai na resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn state_conflicts_map_to_409() {
        assert_eq!(AppError::AssetRented.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::OrderNotInConsignment.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ForeignKeyViolation.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_becomes_resource_not_found() {
        let err = AppError::from_db(sqlx::Error::RowNotFound, "Produto");
        assert!(matches!(err, AppError::ResourceNotFound(ref e) if e == "Produto"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let i18n = I18nStore::new().unwrap();
        let api = AppError::ResourceNotFound("Pedido".into()).to_api_error(&pt(), &i18n);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.message.contains("Pedido"));
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let i18n = I18nStore::new().unwrap();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("O nome é obrigatório.".into());
        errors.add("fullName", err);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &i18n);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["fullName"], vec!["O nome é obrigatório.".to_string()]);
    }

    #[test]
    fn nested_cart_errors_are_flattened() {
        use validator::Validate;

        let i18n = I18nStore::new().unwrap();
        let payload: crate::models::orders::QuotePayload = serde_json::from_value(json!({
            "lines": [
                { "productId": "6f1c2b1e-8a7d-4c1b-9a53-2d9c7f1e0a11", "quantity": 2 },
                { "productId": "6f1c2b1e-8a7d-4c1b-9a53-2d9c7f1e0a11", "quantity": 0 }
            ]
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let details = AppError::ValidationError(errors)
            .to_api_error(&pt(), &i18n)
            .details
            .unwrap();
        assert!(details.contains_key("lines[1].quantity"));
        assert!(!details.contains_key("lines[0].quantity"));
    }

    #[test]
    fn oversized_discounts_and_prices_are_reported_per_field() {
        use validator::Validate;

        let i18n = I18nStore::new().unwrap();
        let payload: crate::models::orders::QuotePayload = serde_json::from_value(json!({
            "lines": [
                { "productId": "6f1c2b1e-8a7d-4c1b-9a53-2d9c7f1e0a11", "quantity": 2, "unitPrice": 7.9e27 }
            ],
            "discount": { "kind": "percent", "value": 1e27 }
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let details = AppError::ValidationError(errors)
            .to_api_error(&pt(), &i18n)
            .details
            .unwrap();
        assert!(details.contains_key("lines[0].unitPrice"));
        assert!(details.contains_key("discount"));
    }

    #[test]
    fn detail_keys_follow_json_casing() {
        assert_eq!(json_field_name("customer_id"), "customerId");
        assert_eq!(json_field_name("expected_return_date"), "expectedReturnDate");
        assert_eq!(json_field_name("returnDate"), "returnDate");
        assert_eq!(json_field_name("quantity"), "quantity");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let i18n = I18nStore::new().unwrap();
        let api = AppError::InternalServerError(anyhow::anyhow!("senha=123"))
            .to_api_error(&pt(), &i18n);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("senha"));
    }
}
