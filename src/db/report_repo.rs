// src/db/report_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        orders::OrderSummary,
        reports::{DashboardStats, OrderFigures},
    },
};

#[derive(Clone, Default)]
pub struct ReportRepository;

impl ReportRepository {
    pub fn new() -> Self {
        Self
    }

    /// Pedidos criados a partir de `since` (todos, se `None`).
    pub async fn order_figures<'e, E>(
        &self,
        executor: E,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<OrderFigures>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, OrderFigures>(
            r#"
            SELECT total_amount, total_liters, status, created_at
            FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
            "#,
        )
            .bind(since)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }

    pub async fn dashboard_stats<'e, E>(&self, executor: E) -> Result<DashboardStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Contagem inclui cancelados; o faturamento não
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products) AS product_count,
                (SELECT COUNT(*) FROM orders) AS order_count,
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_deliveries,
                (SELECT COUNT(*) FROM rentals WHERE status = 'active') AS active_rentals,
                (SELECT COUNT(*) FROM orders WHERE status = 'consignment') AS pending_consignments,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status <> 'cancelled') AS revenue
            "#,
        )
            .fetch_one(executor)
            .await?;
        Ok(stats)
    }

    pub async fn recent_orders<'e, E>(&self, executor: E, limit: i64) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*, c.full_name AS customer_name
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            ORDER BY o.created_at DESC
            LIMIT $1
            "#,
        )
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(orders)
    }
}
