// src/services/order_service.rs

use std::collections::{BTreeSet, HashMap};

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::required},
    db::OrderRepository,
    models::{
        catalog::{MovementType, Product},
        orders::{
            consigned_subtotal, CartLinePayload, CartPricing, CheckoutPayload, ConsignmentOutcome, Discount,
            NewOrder, Order, OrderDetail, OrderStatus, OrderSummary, PricedLine, UpdateOrderPayload,
        },
    },
    services::{catalog_service::CatalogService, rental_service::RentalService},
};

// Teto das listagens de pedidos
pub const MAX_ORDER_LIST: i64 = 500;

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    catalog_service: CatalogService,
    rental_service: RentalService,
    business_offset: FixedOffset,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        catalog_service: CatalogService,
        rental_service: RentalService,
        business_offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            catalog_service,
            rental_service,
            business_offset,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.business_offset).date_naive()
    }

    // =========================================================================
    //  CARRINHO
    // =========================================================================

    /// Lê os produtos do carrinho em ordem de id, para que checkouts concorrentes
    /// travem as linhas na mesma sequência. `lock = false` é leitura simples (orçamento).
    async fn load_products(
        &self,
        conn: &mut PgConnection,
        lines: &[CartLinePayload],
        lock: bool,
    ) -> Result<HashMap<Uuid, Product>, AppError> {
        let ids: BTreeSet<Uuid> = lines.iter().map(|line| line.product_id).collect();
        let mut products = HashMap::with_capacity(ids.len());
        for id in ids {
            let product = if lock {
                self.catalog_service.lock_product(&mut *conn, id).await?
            } else {
                self.catalog_service.get_product(&mut *conn, id).await?.product
            };
            products.insert(id, product);
        }
        Ok(products)
    }

    /// Monta as linhas com preço e litragem do produto, na ordem do carrinho.
    fn price_lines(lines: &[CartLinePayload], products: &HashMap<Uuid, Product>) -> Result<Vec<PricedLine>, AppError> {
        lines
            .iter()
            .map(|line| {
                let product = products
                    .get(&line.product_id)
                    .ok_or_else(|| AppError::ResourceNotFound("Produto".to_string()))?;
                Ok(PricedLine {
                    line_id: line.line_id.unwrap_or_else(Uuid::new_v4),
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.unwrap_or(product.price),
                    liters: product.liters,
                    is_consigned: line.is_consigned,
                })
            })
            .collect()
    }

    /// Precifica o carrinho sem gravar nada.
    pub async fn quote<'e, E>(&self, executor: E, lines: &[CartLinePayload], discount: Discount) -> Result<CartPricing, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let products = self.load_products(&mut *conn, lines, false).await?;
        let priced = Self::price_lines(lines, &products)?;
        Ok(CartPricing::compute(priced, discount))
    }

    // =========================================================================
    //  CHECKOUT
    // =========================================================================

    /// Pedido, itens, baixa de estoque e locação da chopeira numa única transação.
    pub async fn place_order<'e, E>(&self, executor: E, payload: &CheckoutPayload) -> Result<OrderDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let customer_id = required(payload.customer_id, "customerId", "Selecione o cliente.")?;
        let payment_method = required(payload.payment_method, "paymentMethod", "Selecione a forma de pagamento.")?;
        let event_date = required(payload.event_date, "eventDate", "Informe a data do evento.")?;

        if payload.lines.is_empty() && payload.asset_id.is_none() {
            return Err(AppError::EmptyCart);
        }
        let rental_return = match payload.asset_id {
            Some(asset_id) => Some((
                asset_id,
                required(payload.return_date, "returnDate", "Informe a data de devolução da chopeira.")?,
            )),
            None => None,
        };

        let mut tx = executor.begin().await?;

        let products = self.load_products(&mut *tx, &payload.lines, true).await?;
        let priced = Self::price_lines(&payload.lines, &products)?;
        let pricing = CartPricing::compute(priced, payload.discount);

        let order = self
            .repo
            .insert_order(
                &mut *tx,
                &NewOrder {
                    customer_id,
                    total_amount: pricing.total,
                    total_liters: pricing.total_liters,
                    status: pricing.initial_status(),
                    payment_method,
                    delivery_address: payload.delivery_address.clone(),
                    is_consignment: pricing.has_consigned,
                    event_date: Some(event_date),
                    return_date: payload.return_date,
                    notes: pricing.order_notes(payload.notes.as_deref()),
                    delivery_cost: payload.delivery_cost,
                },
            )
            .await?;

        for line in &pricing.lines {
            self.repo
                .insert_item(&mut *tx, order.id, line.product_id, line.quantity, line.unit_price, line.is_consigned)
                .await?;

            self.catalog_service
                .apply_movement(
                    &mut *tx,
                    line.product_id,
                    MovementType::Exit,
                    line.quantity,
                    None,
                    Some("Saída por pedido"),
                    Some(order.id),
                )
                .await?;
        }

        if let Some((asset_id, return_date)) = rental_return {
            self.rental_service
                .create_rental(&mut *tx, asset_id, customer_id, return_date)
                .await?;
        }

        let detail = self.load_detail(&mut *tx, order.id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            customer_id = %customer_id,
            total = %pricing.total,
            liters = %pricing.total_liters,
            consigned = %pricing.consigned_value,
            lines = pricing.lines.len(),
            "Pedido registrado"
        );
        Ok(detail)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    async fn load_detail(&self, conn: &mut PgConnection, id: Uuid) -> Result<OrderDetail, AppError> {
        let summary = self.repo.get_order_summary(&mut *conn, id).await?;
        let items = self.repo.list_item_details(&mut *conn, id).await?;
        let consigned_subtotal = consigned_subtotal(items.iter().map(|detail| &detail.item));

        Ok(OrderDetail {
            header: summary.order,
            customer_name: summary.customer_name,
            items,
            consigned_subtotal,
        })
    }

    pub async fn get_order<'e, E>(&self, executor: E, id: Uuid) -> Result<OrderDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        self.load_detail(&mut *conn, id).await
    }

    pub async fn list_orders<'e, E>(
        &self,
        executor: E,
        status: Option<OrderStatus>,
        customer_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_orders(executor, status, customer_id, limit.clamp(1, MAX_ORDER_LIST))
            .await
    }

    pub async fn list_pending_consignments<'e, E>(&self, executor: E) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_orders(executor, Some(OrderStatus::Consignment), None, MAX_ORDER_LIST)
            .await
    }

    // =========================================================================
    //  EDIÇÃO E FECHAMENTO
    // =========================================================================

    pub async fn update_order<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateOrderPayload) -> Result<Order, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.get_order_for_update(&mut *tx, id).await?;
        let status = payload.status.unwrap_or(current.status);
        if !current.status.can_edit_to(status) {
            return Err(AppError::InvalidOrderTransition);
        }

        let notes = payload.notes.as_deref().or(current.notes.as_deref());
        let address = payload
            .delivery_address
            .as_deref()
            .or(current.delivery_address.as_deref());

        let order = self.repo.update_order(&mut *tx, id, status, notes, address).await?;
        tx.commit().await?;

        tracing::info!(order_id = %id, status = ?order.status, "Pedido atualizado");
        Ok(order)
    }

    pub async fn confirm_sold<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.resolve_consignment(executor, id, ConsignmentOutcome::Sold).await
    }

    pub async fn confirm_returned<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.resolve_consignment(executor, id, ConsignmentOutcome::Returned).await
    }

    // O status "consignment" checado sob trava garante um único ajuste por pedido
    async fn resolve_consignment<'e, E>(&self, executor: E, id: Uuid, outcome: ConsignmentOutcome) -> Result<Order, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self.repo.get_order_for_update(&mut *tx, id).await?;
        if order.status != OrderStatus::Consignment {
            return Err(AppError::OrderNotInConsignment);
        }

        let items = self.repo.list_items(&mut *tx, id).await?;
        let subtotal = consigned_subtotal(&items);
        let total = outcome.adjusted_total(order.total_amount, subtotal);
        let notes = outcome.append_note(order.notes.as_deref(), self.today(), subtotal);

        let order = self.repo.close_consignment(&mut *tx, id, total, &notes).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %id,
            outcome = ?outcome,
            consigned = %subtotal,
            total = %order.total_amount,
            "Consignado resolvido"
        );
        Ok(order)
    }

    /// Cancela sem estornar estoque nem valores.
    pub async fn cancel_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = self.repo.set_status(executor, id, OrderStatus::Cancelled).await?;
        tracing::info!(order_id = %id, "Pedido cancelado");
        Ok(order)
    }

    pub async fn delete_order<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.repo.get_order_for_update(&mut *tx, id).await?;
        let removed_items = self.repo.delete_items(&mut *tx, id).await?;
        self.repo.delete_order(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, removed_items, "Pedido excluído");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{CatalogRepository, DirectoryRepository, RentalRepository},
        models::{
            catalog::ProductPayload,
            directory::{AssetPayload, AssetStatus, CustomerPayload},
            orders::PaymentMethod,
            rentals::RentalStatus,
        },
    };
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    fn service() -> OrderService {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        OrderService::new(
            OrderRepository::new(),
            CatalogService::new(CatalogRepository::new()),
            RentalService::new(RentalRepository::new(), DirectoryRepository::new(), offset),
            offset,
        )
    }

    async fn customer(pool: &PgPool, name: &str) -> Uuid {
        let payload = CustomerPayload {
            full_name: name.to_string(),
            phone: None,
            address: None,
        };
        DirectoryRepository::new().create_customer(pool, &payload).await.unwrap().id
    }

    async fn asset(pool: &PgPool, code: &str) -> Uuid {
        let payload = AssetPayload {
            code: code.to_string(),
            model: None,
            status: None,
        };
        DirectoryRepository::new().create_asset(pool, &payload).await.unwrap().id
    }

    async fn barrel(pool: &PgPool, name: &str, price: i64, stock: i32) -> Uuid {
        let payload = ProductPayload {
            name: name.to_string(),
            description: None,
            price: Decimal::new(price, 0),
            cost_price: Decimal::ZERO,
            liters: Decimal::new(30, 0),
            category: Some("chopp".to_string()),
            image_url: None,
            is_active: true,
        };
        CatalogRepository::new().create_product(pool, &payload, stock).await.unwrap().id
    }

    async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
        CatalogRepository::new().get_product(pool, product_id).await.unwrap().stock_quantity
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn checkout(value: serde_json::Value) -> CheckoutPayload {
        serde_json::from_value(value).unwrap()
    }

    fn line(product_id: Uuid, quantity: i32) -> CartLinePayload {
        CartLinePayload {
            line_id: None,
            product_id,
            quantity,
            is_consigned: false,
            unit_price: None,
        }
    }

    #[test]
    fn priced_lines_keep_cart_order_regardless_of_lookup_order() {
        let now = Utc::now();
        let make = |name: &str, price: i64| Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: Decimal::new(price, 0),
            cost_price: Decimal::ZERO,
            liters: Decimal::new(30, 0),
            initial_stock: 10,
            stock_quantity: 10,
            category: None,
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let pilsen = make("Pilsen", 300);
        let ipa = make("IPA", 420);
        let lines = vec![line(ipa.id, 1), line(pilsen.id, 2), line(ipa.id, 3)];
        let products: HashMap<Uuid, Product> = [(pilsen.id, pilsen.clone()), (ipa.id, ipa.clone())].into();

        let priced = OrderService::price_lines(&lines, &products).unwrap();
        let names: Vec<&str> = priced.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, ["IPA", "Pilsen", "IPA"]);
        assert_eq!(priced[1].unit_price, Decimal::new(300, 0));

        let missing = vec![line(Uuid::new_v4(), 1)];
        assert!(matches!(
            OrderService::price_lines(&missing, &products),
            Err(AppError::ResourceNotFound(_))
        ));
    }

    #[sqlx::test]
    async fn checkout_with_rented_asset_rolls_back_everything(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let maria = customer(&pool, "Maria").await;
        let chopeira = asset(&pool, "CH-010").await;
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 5).await;

        service
            .rental_service
            .create_rental(&pool, chopeira, maria, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap())
            .await
            .unwrap();

        let payload = checkout(json!({
            "customerId": joao,
            "lines": [{ "productId": pilsen, "quantity": 2 }],
            "paymentMethod": "pix",
            "eventDate": "2026-10-18",
            "returnDate": "2026-10-20",
            "assetId": chopeira,
        }));
        let result = service.place_order(&pool, &payload).await;

        assert!(matches!(result, Err(AppError::AssetNotAvailable)));
        assert_eq!(count(&pool, "orders").await, 0);
        assert_eq!(count(&pool, "order_items").await, 0);
        assert_eq!(count(&pool, "stock_movements").await, 0);
        assert_eq!(stock_of(&pool, pilsen).await, 5);
    }

    #[sqlx::test]
    async fn checkout_writes_order_stock_exit_and_rental(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let chopeira = asset(&pool, "CH-011").await;
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 5).await;

        let payload = checkout(json!({
            "customerId": joao,
            "lines": [{ "productId": pilsen, "quantity": 2 }],
            "paymentMethod": "card",
            "eventDate": "2026-10-18",
            "returnDate": "2026-10-20",
            "assetId": chopeira,
        }));
        let detail = service.place_order(&pool, &payload).await.unwrap();

        assert_eq!(detail.header.status, OrderStatus::Pending);
        assert_eq!(detail.header.payment_method, PaymentMethod::Card);
        assert_eq!(detail.header.total_amount, Decimal::new(600, 0));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(stock_of(&pool, pilsen).await, 3);

        let linked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE order_id = $1 AND type = 'exit'")
            .bind(detail.header.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(linked, 1);

        let rentals = service
            .rental_service
            .list_rentals(&pool, Some(RentalStatus::Active))
            .await
            .unwrap();
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].rental.asset_id, chopeira);
        let asset = DirectoryRepository::new().get_asset(&pool, chopeira).await.unwrap();
        assert_eq!(asset.status, AssetStatus::Rented);
    }

    #[sqlx::test]
    async fn consignment_is_settled_only_once(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 5).await;
        let ipa = barrel(&pool, "Barril IPA 30L", 400, 5).await;

        let payload = checkout(json!({
            "customerId": joao,
            "lines": [
                { "productId": pilsen, "quantity": 1 },
                { "productId": ipa, "quantity": 1, "isConsigned": true },
            ],
            "paymentMethod": "cash",
            "eventDate": "2026-10-18",
        }));
        let detail = service.place_order(&pool, &payload).await.unwrap();
        assert_eq!(detail.header.status, OrderStatus::Consignment);
        assert_eq!(detail.header.total_amount, Decimal::new(300, 0));
        assert_eq!(detail.consigned_subtotal, Decimal::new(400, 0));

        let sold = service.confirm_sold(&pool, detail.header.id).await.unwrap();
        assert_eq!(sold.status, OrderStatus::Delivered);
        assert_eq!(sold.total_amount, Decimal::new(700, 0));

        let again = service.confirm_sold(&pool, detail.header.id).await;
        assert!(matches!(again, Err(AppError::OrderNotInConsignment)));
        let returned = service.confirm_returned(&pool, detail.header.id).await;
        assert!(matches!(returned, Err(AppError::OrderNotInConsignment)));

        let current = service.get_order(&pool, detail.header.id).await.unwrap();
        assert_eq!(current.header.total_amount, Decimal::new(700, 0));
    }

    #[sqlx::test]
    async fn order_history_filters_by_customer(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let maria = customer(&pool, "Maria").await;
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 10).await;

        for who in [joao, joao, maria] {
            let payload = checkout(json!({
                "customerId": who,
                "lines": [{ "productId": pilsen, "quantity": 1 }],
                "paymentMethod": "to_be_agreed",
                "eventDate": "2026-10-18",
            }));
            service.place_order(&pool, &payload).await.unwrap();
        }

        let history = service.list_orders(&pool, None, Some(joao), 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|summary| summary.order.customer_id == joao));
        assert_eq!(service.list_orders(&pool, None, None, 10).await.unwrap().len(), 3);
    }

    #[sqlx::test]
    async fn quote_reads_prices_without_writing(pool: PgPool) {
        let service = service();
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 5).await;

        let pricing = service
            .quote(&pool, &[line(pilsen, 2)], Discount::default())
            .await
            .unwrap();
        assert_eq!(pricing.total, Decimal::new(600, 0));
        assert_eq!(stock_of(&pool, pilsen).await, 5);
        assert_eq!(count(&pool, "stock_movements").await, 0);
    }

    #[sqlx::test]
    async fn cancelled_orders_count_on_dashboard_but_not_in_revenue(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let pilsen = barrel(&pool, "Barril Pilsen 30L", 300, 10).await;

        let mut ids = Vec::new();
        for _ in 0..2 {
            let payload = checkout(json!({
                "customerId": joao,
                "lines": [{ "productId": pilsen, "quantity": 1 }],
                "paymentMethod": "pix",
                "eventDate": "2026-10-18",
            }));
            ids.push(service.place_order(&pool, &payload).await.unwrap().header.id);
        }
        service.cancel_order(&pool, ids[0]).await.unwrap();

        let stats = crate::db::ReportRepository::new().dashboard_stats(&pool).await.unwrap();
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.revenue, Decimal::new(300, 0));
    }
}
