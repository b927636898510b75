// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    format::{format_brl, format_date_br},
    validation::{max_money, validate_money, validate_not_negative},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
    Consignment,
}

impl OrderStatus {
    /// Regras da edição livre do pedido. O status "consignment" só nasce no checkout
    /// e só termina pela confirmação de venda/devolução.
    pub fn can_edit_to(self, next: OrderStatus) -> bool {
        if self == next {
            return true;
        }
        self != OrderStatus::Consignment && next != OrderStatus::Consignment
    }
}

// Dinheiro, cartão, PIX ou "a combinar"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
    ToBeAgreed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    #[default]
    Percent,
    Fixed,
}

// --- Registros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    // Só o que é cobrado: itens consignados ficam de fora até a confirmação
    #[schema(example = "270.00")]
    pub total_amount: Decimal,
    #[schema(example = "30")]
    pub total_liters: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address: Option<String>,
    pub is_consignment: bool,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-18")]
    pub event_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub return_date: Option<NaiveDate>,
    pub notes: Option<String>,
    // Custo interno do frete; nunca entra no total do cliente
    #[schema(example = "25.00")]
    pub delivery_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 1)]
    pub quantity: i32,
    #[schema(example = "300.00")]
    pub unit_price: Decimal,
    pub is_consigned: bool,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: Option<String>,
    pub product_liters: Option<Decimal>,
}

// Pedido + nome do cliente (listagens)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub customer_name: Option<String>,
    pub items: Vec<OrderItemDetail>,
    #[schema(example = "50.00")]
    pub consigned_subtotal: Decimal,
}

// Dados do cabeçalho gravado no checkout
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub total_liters: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address: Option<String>,
    pub is_consignment: bool,
    pub event_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub delivery_cost: Decimal,
}

/// Valor (preço × quantidade) das linhas consignadas do pedido.
pub fn consigned_subtotal<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    items
        .into_iter()
        .filter(|item| item.is_consigned)
        .map(OrderItem::line_total)
        .sum()
}

// =============================================================================
//  CARRINHO E PRECIFICAÇÃO
// =============================================================================

/// Linha do carrinho já com o preço e a litragem do produto.
/// Cada "adicionar ao carrinho" gera uma linha própria, mesmo para o mesmo produto.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub line_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub liters: Decimal,
    pub is_consigned: bool,
}

impl PricedLine {
    pub fn value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn volume(&self) -> Decimal {
        self.liters * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_discount_limit"))]
pub struct Discount {
    #[serde(default)]
    pub kind: DiscountKind,
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "10")]
    pub value: Decimal,
}

// Percentual vai até 100%; valor fixo segue o teto das colunas de dinheiro
fn validate_discount_limit(discount: &Discount) -> Result<(), ValidationError> {
    let (limit, message) = match discount.kind {
        DiscountKind::Percent => (Decimal::ONE_HUNDRED, "O desconto não pode passar de 100%."),
        DiscountKind::Fixed => (max_money(), "O desconto excede o limite permitido."),
    };
    if discount.value > limit {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &limit);
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

impl Discount {
    /// O desconto incide apenas sobre o subtotal cobrável.
    pub fn amount_on(&self, chargeable: Decimal) -> Decimal {
        match self.kind {
            DiscountKind::Percent => chargeable * self.value / Decimal::ONE_HUNDRED,
            DiscountKind::Fixed => self.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    pub lines: Vec<PricedLine>,
    pub regular_subtotal: Decimal,
    pub consigned_value: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub total_liters: Decimal,
    pub consigned_liters: Decimal,
    pub has_consigned: bool,
}

impl CartPricing {
    pub fn compute(lines: Vec<PricedLine>, discount: Discount) -> Self {
        let mut regular_subtotal = Decimal::ZERO;
        let mut consigned_value = Decimal::ZERO;
        let mut total_liters = Decimal::ZERO;
        let mut consigned_liters = Decimal::ZERO;

        for line in &lines {
            total_liters += line.volume();
            if line.is_consigned {
                consigned_value += line.value();
                consigned_liters += line.volume();
            } else {
                regular_subtotal += line.value();
            }
        }

        let discount_amount = discount.amount_on(regular_subtotal);
        let total = (regular_subtotal - discount_amount).max(Decimal::ZERO);
        let has_consigned = lines.iter().any(|l| l.is_consigned);

        Self {
            lines,
            regular_subtotal,
            consigned_value,
            discount_amount,
            total,
            total_liters,
            consigned_liters,
            has_consigned,
        }
    }

    pub fn initial_status(&self) -> OrderStatus {
        if self.has_consigned {
            OrderStatus::Consignment
        } else {
            OrderStatus::Pending
        }
    }

    /// Observação gravada no pedido; consignados ganham o prefixo com a litragem.
    pub fn order_notes(&self, notes: Option<&str>) -> Option<String> {
        let notes = notes.unwrap_or_default();
        let full = if self.has_consigned {
            format!("📦 Consignado: {}L | {}", self.consigned_liters.normalize(), notes)
        } else {
            notes.to_string()
        };
        let trimmed = full.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

// --- Payloads do PDV ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePayload {
    // Gerado no servidor quando o cliente não manda
    pub line_id: Option<Uuid>,
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 10000, message = "A quantidade deve estar entre 1 e 10000."))]
    #[schema(example = 1)]
    pub quantity: i32,
    #[serde(default)]
    pub is_consigned: bool,
    // Sobrescreve o preço de tabela do produto
    #[validate(custom(function = "validate_money"))]
    #[schema(example = "300.00")]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    #[validate(nested)]
    pub lines: Vec<CartLinePayload>,
    #[serde(default)]
    #[validate(nested)]
    pub discount: Discount,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(required(message = "Selecione o cliente."))]
    pub customer_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub lines: Vec<CartLinePayload>,

    #[serde(default)]
    #[validate(nested)]
    pub discount: Discount,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub delivery_address: Option<String>,

    #[validate(required(message = "Selecione a forma de pagamento."))]
    #[schema(example = "pix")]
    pub payment_method: Option<PaymentMethod>,

    #[validate(required(message = "Informe a data do evento."))]
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-18")]
    pub event_date: Option<NaiveDate>,

    // Obrigatória quando há chopeira no pedido
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub return_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom(function = "validate_money"))]
    #[schema(example = "25.00")]
    pub delivery_cost: Decimal,

    pub notes: Option<String>,

    // Chopeira que sai junto com o pedido
    pub asset_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
}

// =============================================================================
//  RESOLUÇÃO DE CONSIGNADO
// =============================================================================

/// Política adotada: vendido soma o valor consignado ao total (o cliente passa a dever);
/// devolvido lacrado mantém o total (nada foi cobrado, nada é devido).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsignmentOutcome {
    Sold,
    Returned,
}

impl ConsignmentOutcome {
    pub fn adjusted_total(self, current_total: Decimal, consigned_subtotal: Decimal) -> Decimal {
        match self {
            ConsignmentOutcome::Sold => current_total + consigned_subtotal,
            ConsignmentOutcome::Returned => current_total,
        }
    }

    pub fn audit_note(self, today: NaiveDate, consigned_subtotal: Decimal) -> String {
        match self {
            ConsignmentOutcome::Sold => format!(
                "✅ Consignado VENDIDO em {} (+{})",
                format_date_br(today),
                format_brl(consigned_subtotal)
            ),
            ConsignmentOutcome::Returned => format!(
                "📦 Consignado DEVOLVIDO lacrado em {} ({} não cobrado)",
                format_date_br(today),
                format_brl(consigned_subtotal)
            ),
        }
    }

    pub fn append_note(self, existing: Option<&str>, today: NaiveDate, consigned_subtotal: Decimal) -> String {
        format!(
            "{} | {}",
            existing.unwrap_or_default(),
            self.audit_note(today, consigned_subtotal)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn dec(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap()
    }

    fn line(name: &str, price: f64, qty: i32, liters: f64, consigned: bool) -> PricedLine {
        PricedLine {
            line_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            quantity: qty,
            unit_price: dec(price),
            liters: dec(liters),
            is_consigned: consigned,
        }
    }

    #[test]
    fn consigned_lines_are_excluded_from_total_but_not_from_liters() {
        let cart = vec![
            line("Barril 30L", 300.0, 1, 30.0, false),
            line("Chopeira acessório", 50.0, 1, 0.0, true),
        ];
        let pricing = CartPricing::compute(cart, Discount { kind: DiscountKind::Percent, value: dec(10.0) });

        assert_eq!(pricing.regular_subtotal, dec(300.0));
        assert_eq!(pricing.consigned_value, dec(50.0));
        assert_eq!(pricing.discount_amount, dec(30.0));
        assert_eq!(pricing.total, dec(270.0));
        assert_eq!(pricing.total_liters, dec(30.0));
        assert!(pricing.has_consigned);
        assert_eq!(pricing.initial_status(), OrderStatus::Consignment);
    }

    #[test]
    fn consigned_volume_counts_in_total_liters() {
        let cart = vec![
            line("Barril 50L", 450.0, 2, 50.0, false),
            line("Barril 30L", 300.0, 1, 30.0, true),
        ];
        let pricing = CartPricing::compute(cart, Discount::default());

        assert_eq!(pricing.total, dec(900.0));
        assert_eq!(pricing.total_liters, dec(130.0));
        assert_eq!(pricing.consigned_liters, dec(30.0));
    }

    #[test]
    fn fixed_discount_never_makes_total_negative() {
        let cart = vec![line("Copo", 50.0, 1, 0.0, false)];
        let pricing = CartPricing::compute(cart, Discount { kind: DiscountKind::Fixed, value: dec(200.0) });
        assert_eq!(pricing.total, Decimal::ZERO);
    }

    #[test]
    fn same_product_added_twice_stays_as_two_lines() {
        let a = line("Barril 30L", 300.0, 1, 30.0, false);
        let mut b = a.clone();
        b.line_id = Uuid::new_v4();
        let pricing = CartPricing::compute(vec![a, b], Discount::default());
        assert_eq!(pricing.lines.len(), 2);
        assert_eq!(pricing.total, dec(600.0));
    }

    #[test]
    fn largest_accepted_values_price_without_overflow() {
        let mut big = line("Barril 50L", 0.0, 10_000, 99_999_999.99, false);
        big.unit_price = max_money();
        let pricing = CartPricing::compute(
            vec![big.clone(), big],
            Discount { kind: DiscountKind::Percent, value: Decimal::ONE_HUNDRED },
        );
        assert_eq!(pricing.regular_subtotal, max_money() * Decimal::from(20_000));
        assert_eq!(pricing.total, Decimal::ZERO);
    }

    #[test]
    fn percent_discount_is_capped_at_one_hundred() {
        let percent = |v: f64| Discount { kind: DiscountKind::Percent, value: dec(v) };
        assert!(percent(100.0).validate().is_ok());
        assert!(percent(100.5).validate().is_err());
        assert!(Discount { kind: DiscountKind::Fixed, value: dec(150.0) }.validate().is_ok());
        assert!(Discount { kind: DiscountKind::Fixed, value: Decimal::MAX }.validate().is_err());
    }

    #[test]
    fn payment_method_uses_snake_case() {
        let method: PaymentMethod = serde_json::from_str("\"to_be_agreed\"").unwrap();
        assert_eq!(method, PaymentMethod::ToBeAgreed);
        assert_eq!(serde_json::to_string(&PaymentMethod::Pix).unwrap(), "\"pix\"");
    }

    #[test]
    fn regular_cart_starts_pending_without_prefix() {
        let pricing = CartPricing::compute(vec![line("Barril 30L", 300.0, 1, 30.0, false)], Discount::default());
        assert_eq!(pricing.initial_status(), OrderStatus::Pending);
        assert_eq!(pricing.order_notes(Some("  festa  ")), Some("festa".to_string()));
        assert_eq!(pricing.order_notes(None), None);
    }

    #[test]
    fn consigned_cart_notes_carry_liters_prefix() {
        let pricing = CartPricing::compute(vec![line("Barril 30L", 300.0, 2, 30.0, true)], Discount::default());
        assert_eq!(
            pricing.order_notes(Some("entregar cedo")),
            Some("📦 Consignado: 60L | entregar cedo".to_string())
        );
        assert_eq!(pricing.order_notes(None), Some("📦 Consignado: 60L |".to_string()));
    }

    // A direção do ajuste já teve duas versões; fica fixada aqui: vendido soma, devolvido mantém.
    #[test]
    fn sold_adds_consigned_subtotal_once() {
        let total = ConsignmentOutcome::Sold.adjusted_total(dec(270.0), dec(50.0));
        assert_eq!(total, dec(320.0));
    }

    #[test]
    fn returned_keeps_total_unchanged() {
        let total = ConsignmentOutcome::Returned.adjusted_total(dec(270.0), dec(50.0));
        assert_eq!(total, dec(270.0));
    }

    #[test]
    fn consigned_subtotal_only_sums_consigned_items() {
        let order_id = Uuid::new_v4();
        let item = |price: f64, qty: i32, consigned: bool| OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Uuid::new_v4(),
            quantity: qty,
            unit_price: dec(price),
            is_consigned: consigned,
        };
        let items = vec![item(300.0, 1, false), item(50.0, 2, true), item(10.0, 1, true)];
        assert_eq!(consigned_subtotal(&items), dec(110.0));
    }

    #[test]
    fn audit_note_is_appended_to_existing_notes() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let note = ConsignmentOutcome::Sold.append_note(Some("📦 Consignado: 30L | festa"), today, dec(50.0));
        assert_eq!(note, "📦 Consignado: 30L | festa | ✅ Consignado VENDIDO em 16/10/2026 (+R$ 50,00)");

        let note = ConsignmentOutcome::Returned.append_note(None, today, dec(1234.5));
        assert_eq!(note, " | 📦 Consignado DEVOLVIDO lacrado em 16/10/2026 (R$ 1.234,50 não cobrado)");
    }

    #[test]
    fn consignment_status_is_only_left_through_resolution() {
        assert!(!OrderStatus::Consignment.can_edit_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_edit_to(OrderStatus::Consignment));
        assert!(OrderStatus::Pending.can_edit_to(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.can_edit_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Consignment.can_edit_to(OrderStatus::Consignment));
    }
}
