// src/db/directory_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::directory::{Asset, AssetPayload, AssetStatus, Customer, CustomerPayload},
};

const CUSTOMER: &str = "Cliente";
const ASSET: &str = "Equipamento";

#[derive(Clone, Default)]
pub struct DirectoryRepository;

impl DirectoryRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_customers<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY full_name ASC")
            .fetch_all(executor)
            .await?;
        Ok(customers)
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, CUSTOMER))
    }

    pub async fn create_customer<'e, E>(&self, executor: E, data: &CustomerPayload) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (full_name, phone, address)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(data.full_name.trim())
            .bind(data.phone.as_deref())
            .bind(data.address.as_deref())
            .fetch_one(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &CustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET full_name = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(data.full_name.trim())
            .bind(data.phone.as_deref())
            .bind(data.address.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, CUSTOMER))
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, CUSTOMER))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(CUSTOMER.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    //  EQUIPAMENTOS
    // =========================================================================

    pub async fn list_assets<'e, E>(&self, executor: E) -> Result<Vec<Asset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY code ASC")
            .fetch_all(executor)
            .await?;
        Ok(assets)
    }

    pub async fn get_asset<'e, E>(&self, executor: E, id: Uuid) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ASSET))
    }

    /// Trava o equipamento: duas locações simultâneas do mesmo item ficam serializadas.
    pub async fn get_asset_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ASSET))
    }

    pub async fn create_asset<'e, E>(&self, executor: E, data: &AssetPayload) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (code, model, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(data.code.trim())
            .bind(data.model.as_deref())
            .bind(data.status.unwrap_or(AssetStatus::Available))
            .fetch_one(executor)
            .await?;
        Ok(asset)
    }

    pub async fn update_asset<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        code: &str,
        model: Option<&str>,
        status: AssetStatus,
    ) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets
            SET code = $2, model = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(code)
            .bind(model)
            .bind(status)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ASSET))
    }

    pub async fn set_asset_status<'e, E>(&self, executor: E, id: Uuid, status: AssetStatus) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(status)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, ASSET))
    }

    pub async fn delete_asset<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_db(e, ASSET))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(ASSET.to_string()));
        }
        Ok(())
    }
}
