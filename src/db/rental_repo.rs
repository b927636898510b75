// src/db/rental_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rentals::{Rental, RentalDetail, RentalStatus},
};

const RENTAL: &str = "Locação";

#[derive(Clone, Default)]
pub struct RentalRepository;

impl RentalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_rental<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        customer_id: Uuid,
        expected_return_date: NaiveDate,
    ) -> Result<Rental, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (asset_id, customer_id, expected_return_date, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING *
            "#,
        )
            .bind(asset_id)
            .bind(customer_id)
            .bind(expected_return_date)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // O índice parcial garante uma locação ativa por equipamento
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::AssetNotAvailable;
                    }
                    if db_err.is_foreign_key_violation() {
                        return AppError::ResourceNotFound("Cliente".to_string());
                    }
                }
                e.into()
            })
    }

    pub async fn get_rental_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Rental, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, RENTAL))
    }

    pub async fn mark_returned<'e, E>(&self, executor: E, id: Uuid) -> Result<Rental, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = 'returned', returned_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, RENTAL))
    }

    pub async fn list_rentals<'e, E>(
        &self,
        executor: E,
        status: Option<RentalStatus>,
    ) -> Result<Vec<RentalDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rentals = sqlx::query_as::<_, RentalDetail>(
            r#"
            SELECT
                r.*,
                c.full_name AS customer_name,
                a.code AS asset_code,
                a.model AS asset_model
            FROM rentals r
            LEFT JOIN customers c ON c.id = r.customer_id
            LEFT JOIN assets a ON a.id = r.asset_id
            WHERE ($1::rental_status IS NULL OR r.status = $1)
            ORDER BY r.expected_return_date ASC
            "#,
        )
            .bind(status)
            .fetch_all(executor)
            .await?;
        Ok(rentals)
    }
}
