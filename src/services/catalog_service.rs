// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{
        CreateProductPayload, MovementType, Product, ProductPayload, ProductView, StockAudit,
        StockMovement, StockMovementReceipt, StockSummary,
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products<'e, E>(&self, executor: E, active_only: bool) -> Result<Vec<ProductView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = self.repo.list_products(executor, active_only).await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = self.repo.get_product(executor, id).await?;
        Ok(product.into())
    }

    /// Trava o produto na transação do chamador (checkout).
    pub async fn lock_product(&self, conn: &mut PgConnection, id: Uuid) -> Result<Product, AppError> {
        self.repo.get_product_for_update(conn, id).await
    }

    pub async fn create_product<'e, E>(&self, executor: E, payload: &CreateProductPayload) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = self
            .repo
            .create_product(executor, &payload.product, payload.stock_quantity)
            .await?;

        tracing::info!(
            product_id = %product.id,
            initial_stock = product.initial_stock,
            "Produto cadastrado: {}",
            product.name
        );
        Ok(product.into())
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = self.repo.update_product(executor, id, payload).await?;
        Ok(product.into())
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_product(executor, id).await?;
        tracing::info!(product_id = %id, "Produto excluído");
        Ok(())
    }

    pub async fn stock_summary<'e, E>(&self, executor: E) -> Result<StockSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.stock_summary(executor).await
    }

    // =========================================================================
    //  MOVIMENTAÇÕES
    // =========================================================================

    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        unit_cost: Decimal,
        notes: Option<&str>,
    ) -> Result<StockMovementReceipt, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (movement, product) = self
            .apply_movement(&mut *tx, product_id, movement_type, quantity, Some(unit_cost), notes, None)
            .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %product_id,
            movement = ?movement_type,
            quantity,
            stock = product.stock_quantity,
            "Movimentação de estoque registrada"
        );

        Ok(StockMovementReceipt {
            movement,
            product: product.into(),
        })
    }

    /// Grava a movimentação e aplica no saldo, dentro da transação recebida.
    /// `unit_cost = None` registra o custo atual do produto (saídas do checkout).
    pub async fn apply_movement(
        &self,
        conn: &mut PgConnection,
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        unit_cost: Option<Decimal>,
        notes: Option<&str>,
        order_id: Option<Uuid>,
    ) -> Result<(StockMovement, Product), AppError> {
        let product = self.repo.get_product_for_update(&mut *conn, product_id).await?;
        let unit_cost = unit_cost.unwrap_or(product.cost_price);

        let movement = self
            .repo
            .insert_movement(&mut *conn, product_id, movement_type, quantity, unit_cost, notes, order_id)
            .await?;

        let new_quantity = movement_type.apply(product.stock_quantity, quantity);
        let new_cost = movement_type.resulting_cost(product.cost_price, unit_cost);

        let product = self
            .repo
            .set_stock(&mut *conn, product_id, new_quantity, new_cost)
            .await?;

        Ok((movement, product))
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
        self.repo.list_movements(executor, product_id, limit).await
    }

    // =========================================================================
    //  AUDITORIA DO SALDO
    // =========================================================================

    pub async fn reconcile_stock<'e, E>(&self, executor: E, product_id: Uuid, apply: bool) -> Result<StockAudit, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.repo.get_product_for_update(&mut *tx, product_id).await?;
        let log = self.repo.movement_log(&mut *tx, product_id).await?;
        let mut audit = StockAudit::for_product(&product, &log);

        if apply && audit.has_drift() {
            self.repo
                .set_stock(&mut *tx, product_id, audit.expected, product.cost_price)
                .await?;
            audit.applied = true;

            tracing::info!(
                product_id = %product_id,
                recorded = audit.recorded,
                expected = audit.expected,
                "Saldo de estoque corrigido pelo histórico"
            );
        }

        tx.commit().await?;
        Ok(audit)
    }

    /// Confere todos os produtos e devolve só os que divergem do histórico.
    pub async fn reconcile_all<'e, E>(&self, executor: E) -> Result<Vec<StockAudit>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let products = self.repo.list_products(&mut *conn, false).await?;
        let mut drifting = Vec::new();
        for product in &products {
            let log = self.repo.movement_log(&mut *conn, product.id).await?;
            let audit = StockAudit::for_product(product, &log);
            if audit.has_drift() {
                drifting.push(audit);
            }
        }

        if !drifting.is_empty() {
            tracing::warn!(count = drifting.len(), "Produtos com saldo divergente do histórico");
        }
        Ok(drifting)
    }
}
