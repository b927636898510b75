// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{MovementType, Product, ProductPayload, StockMovement, StockSummary},
};

const PRODUCT: &str = "Produto";

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products<'e, E>(&self, executor: E, active_only: bool) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE ($1 = FALSE OR is_active) ORDER BY name ASC",
        )
            .bind(active_only)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))
    }

    /// Trava a linha do produto até o fim da transação.
    pub async fn get_product_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        data: &ProductPayload,
        initial_stock: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, description, price, cost_price, liters,
                initial_stock, stock_quantity, category, image_url, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(&data.name)
            .bind(data.description.as_deref())
            .bind(data.price)
            .bind(data.cost_price)
            .bind(data.liters)
            .bind(initial_stock)
            .bind(data.category.as_deref())
            .bind(data.image_url.as_deref())
            .bind(data.is_active)
            .fetch_one(executor)
            .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, cost_price = $5, liters = $6,
                category = $7, image_url = $8, is_active = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&data.name)
            .bind(data.description.as_deref())
            .bind(data.price)
            .bind(data.cost_price)
            .bind(data.liters)
            .bind(data.category.as_deref())
            .bind(data.image_url.as_deref())
            .bind(data.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(PRODUCT.to_string()));
        }
        Ok(())
    }

    /// Grava o saldo (e o custo) já calculados pelo service.
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stock_quantity: i32,
        cost_price: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_quantity = $2, cost_price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(stock_quantity)
            .bind(cost_price)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))
    }

    // ---
    // Movimentações
    // ---

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        unit_cost: Decimal,
        notes: Option<&str>,
        order_id: Option<Uuid>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, type, quantity, unit_cost, notes, order_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(product_id)
            .bind(movement_type)
            .bind(quantity)
            .bind(unit_cost)
            .bind(notes)
            .bind(order_id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, PRODUCT))
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        product_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
            .bind(product_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(movements)
    }

    /// Histórico completo do produto em ordem cronológica (para reconstruir o saldo).
    pub async fn movement_log<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<(MovementType, i32)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let log = sqlx::query_as::<_, (MovementType, i32)>(
            r#"
            SELECT type, quantity FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(log)
    }

    pub async fn stock_summary<'e, E>(&self, executor: E) -> Result<StockSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (product_count, total_units, total_stock_value, total_sale_value) =
            sqlx::query_as::<_, (i64, i64, Decimal, Decimal)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(stock_quantity), 0)::bigint,
                    COALESCE(SUM(cost_price * stock_quantity), 0),
                    COALESCE(SUM(price * stock_quantity), 0)
                FROM products
                "#,
            )
                .fetch_one(executor)
                .await?;

        Ok(StockSummary::new(product_count, total_units, total_stock_value, total_sale_value))
    }
}
