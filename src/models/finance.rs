// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_money;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Delivery, // Entrega
    Fuel,     // Combustível
    Supplies, // Insumos
    Salary,   // Salário
    Other,    // Outros
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Delivery,
        ExpenseCategory::Fuel,
        ExpenseCategory::Supplies,
        ExpenseCategory::Salary,
        ExpenseCategory::Other,
    ];
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Gasolina da van")]
    pub description: String,
    pub category: ExpenseCategory,
    #[schema(example = "120.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "Carlos Souza")]
    pub name: String,
    #[schema(example = "Entregador")]
    pub role: Option<String>,
    // Valor mensal recorrente, não é lançamento
    #[schema(example = "2200.00")]
    pub salary: Decimal,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    #[schema(example = "Gasolina da van")]
    pub description: String,

    pub category: ExpenseCategory,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "120.00")]
    pub amount: Decimal,

    // Ausente = hoje
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-16")]
    pub date: Option<NaiveDate>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Carlos Souza")]
    pub name: String,

    pub role: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    #[schema(example = "2200.00")]
    pub salary: Decimal,

    pub phone: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
