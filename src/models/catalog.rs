// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_money, validate_not_negative};

// --- Tipo de movimentação (Postgres: movement_type) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Entry, // Entrada (compra, ajuste positivo)
    Exit,  // Saída (venda, perda, ajuste negativo)
}

impl MovementType {
    /// Novo saldo após aplicar a movimentação. Saídas nunca deixam o saldo negativo.
    pub fn apply(self, current: i32, quantity: i32) -> i32 {
        match self {
            MovementType::Entry => current.saturating_add(quantity),
            MovementType::Exit => current.saturating_sub(quantity).max(0),
        }
    }

    /// Custo unitário que o produto passa a ter: só a entrada sobrescreve.
    pub fn resulting_cost(self, current_cost: Decimal, unit_cost: Decimal) -> Decimal {
        match self {
            MovementType::Entry => unit_cost,
            MovementType::Exit => current_cost,
        }
    }
}

// --- Produto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Barril Pilsen 30L")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "300.00")]
    pub price: Decimal,
    #[schema(example = "180.00")]
    pub cost_price: Decimal,
    #[schema(example = "30")]
    pub liters: Decimal,
    // Saldo no momento do cadastro, ponto de partida da auditoria
    pub initial_stock: i32,
    pub stock_quantity: i32,
    #[schema(example = "chopp")]
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn margin_percent(&self) -> Decimal {
        margin_percent(self.price, self.cost_price)
    }
}

/// Margem sobre o custo, em %. Custo zero devolve 0 em vez de dividir por zero.
pub fn margin_percent(price: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        return Decimal::ZERO;
    }
    ((price - cost) / cost * Decimal::ONE_HUNDRED).round_dp(2)
}

// Produto como aparece nas listagens (com a margem calculada)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[schema(example = "66.67")]
    pub margin_percent: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let margin_percent = product.margin_percent();
        Self { product, margin_percent }
    }
}

// --- Payloads de cadastro ---

// Campos editáveis do produto. O saldo não entra aqui: só muda por movimentação.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Barril Pilsen 30L")]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "300.00")]
    pub price: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[serde(default)]
    #[schema(example = "180.00")]
    pub cost_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "30")]
    pub liters: Decimal,

    #[schema(example = "chopp")]
    pub category: Option<String>,

    pub image_url: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub product: ProductPayload,

    // Saldo inicial (vira a base da auditoria de estoque)
    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    #[schema(example = 10)]
    pub stock_quantity: i32,
}

// --- Movimentação de estoque (livro-razão, só inserção) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[schema(example = 10)]
    pub quantity: i32,
    #[schema(example = "180.00")]
    pub unit_cost: Decimal,
    #[schema(example = "Compra fornecedor")]
    pub notes: Option<String>,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementPayload {
    pub product_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 10)]
    pub quantity: i32,
    // Só faz diferença na entrada (vira o novo custo do produto)
    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    #[schema(example = "180.00")]
    pub unit_cost: Decimal,
    pub notes: Option<String>,
}

// Movimentação gravada + produto com o saldo novo
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementReceipt {
    pub movement: StockMovement,
    pub product: ProductView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub product_count: i64,
    pub total_units: i64,
    // Saldo a preço de custo
    #[schema(example = "5400.00")]
    pub total_stock_value: Decimal,
    // Saldo a preço de venda
    #[schema(example = "9000.00")]
    pub total_sale_value: Decimal,
    #[schema(example = "3600.00")]
    pub potential_profit: Decimal,
}

impl StockSummary {
    pub fn new(product_count: i64, total_units: i64, total_stock_value: Decimal, total_sale_value: Decimal) -> Self {
        Self {
            product_count,
            total_units,
            total_stock_value,
            total_sale_value,
            potential_profit: total_sale_value - total_stock_value,
        }
    }
}

// Resultado da conferência do saldo contra o histórico de movimentações
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAudit {
    pub product_id: Uuid,
    pub product_name: String,
    pub recorded: i32,
    pub expected: i32,
    pub drift: i32,
    pub applied: bool,
}

impl StockAudit {
    /// Refaz o saldo a partir do estoque inicial aplicando as movimentações em ordem cronológica.
    pub fn replay(initial_stock: i32, movements: &[(MovementType, i32)]) -> i32 {
        movements
            .iter()
            .fold(initial_stock, |qty, (kind, amount)| kind.apply(qty, *amount))
    }

    pub fn for_product(product: &Product, movements: &[(MovementType, i32)]) -> Self {
        let expected = Self::replay(product.initial_stock, movements);
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            recorded: product.stock_quantity,
            expected,
            drift: product.stock_quantity - expected,
            applied: false,
        }
    }

    pub fn has_drift(&self) -> bool {
        self.drift != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn dec(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap()
    }

    #[test]
    fn exit_larger_than_stock_clamps_to_zero() {
        assert_eq!(MovementType::Exit.apply(3, 10), 0);
        assert_eq!(MovementType::Exit.apply(0, 1), 0);
        assert_eq!(MovementType::Exit.apply(10, 4), 6);
    }

    #[test]
    fn entry_adds_to_stock() {
        assert_eq!(MovementType::Entry.apply(3, 10), 13);
    }

    #[test]
    fn only_entries_overwrite_cost_basis() {
        assert_eq!(MovementType::Entry.resulting_cost(dec(150.0), dec(175.5)), dec(175.5));
        assert_eq!(MovementType::Exit.resulting_cost(dec(150.0), dec(999.0)), dec(150.0));
    }

    #[test]
    fn margin_with_zero_cost_is_zero() {
        assert_eq!(margin_percent(dec(10.0), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn margin_is_relative_to_cost() {
        assert_eq!(margin_percent(dec(300.0), dec(200.0)), dec(50.0));
        assert_eq!(margin_percent(dec(150.0), dec(200.0)), dec(-25.0));
    }

    #[test]
    fn potential_profit_is_sale_value_minus_cost_value() {
        let summary = StockSummary::new(3, 30, dec(5400.0), dec(9000.0));
        assert_eq!(summary.potential_profit, dec(3600.0));

        let underwater = StockSummary::new(1, 2, dec(400.0), dec(300.0));
        assert_eq!(underwater.potential_profit, dec(-100.0));
    }

    #[test]
    fn replay_follows_clamp_rule() {
        let log = vec![
            (MovementType::Exit, 5),
            (MovementType::Entry, 4),
            (MovementType::Exit, 1),
        ];
        // 2 -> 0 (clamp) -> 4 -> 3
        assert_eq!(StockAudit::replay(2, &log), 3);
        assert_eq!(StockAudit::replay(7, &[]), 7);
    }
}
