// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{NewOrder, Order, OrderItem, OrderItemDetail, OrderStatus, OrderSummary},
};

const ORDER: &str = "Pedido";

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn insert_order<'e, E>(&self, executor: E, data: &NewOrder) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                customer_id, total_amount, total_liters, status, payment_method,
                delivery_address, is_consignment, event_date, return_date, notes, delivery_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
            .bind(data.customer_id)
            .bind(data.total_amount)
            .bind(data.total_liters)
            .bind(data.status)
            .bind(data.payment_method)
            .bind(data.delivery_address.as_deref())
            .bind(data.is_consignment)
            .bind(data.event_date)
            .bind(data.return_date)
            .bind(data.notes.as_deref())
            .bind(data.delivery_cost)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ResourceNotFound("Cliente".to_string());
                    }
                }
                e.into()
            })
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        is_consigned: bool,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, is_consigned)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(is_consigned)
            .fetch_one(executor)
            .await?;
        Ok(item)
    }

    pub async fn update_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
        notes: Option<&str>,
        delivery_address: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, notes = $3, delivery_address = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(notes)
            .bind(delivery_address)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))
    }

    /// Encerra o consignado: entregue, sem consignação pendente, total e observação ajustados.
    pub async fn close_consignment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        total_amount: Decimal,
        notes: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'delivered', is_consignment = FALSE,
                total_amount = $2, notes = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(total_amount)
            .bind(notes)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: OrderStatus) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(status)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))
    }

    pub async fn delete_items<'e, E>(&self, executor: E, order_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_order<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(ORDER.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn get_order_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))
    }

    pub async fn get_order_summary<'e, E>(&self, executor: E, id: Uuid) -> Result<OrderSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*, c.full_name AS customer_name
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            WHERE o.id = $1
            "#,
        )
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ORDER))
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
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*, c.full_name AS customer_name
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            WHERE ($1::order_status IS NULL OR o.status = $1)
              AND ($2::uuid IS NULL OR o.customer_id = $2)
            ORDER BY o.created_at DESC
            LIMIT $3
            "#,
        )
            .bind(status)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn list_items<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn list_item_details<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.*, p.name AS product_name, p.liters AS product_liters
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            "#,
        )
            .bind(order_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }
}
