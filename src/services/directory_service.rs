// src/services/directory_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DirectoryRepository,
    models::directory::{Asset, AssetPayload, AssetStatus, Customer, CustomerPayload},
};

#[derive(Clone)]
pub struct DirectoryService {
    repo: DirectoryRepository,
}

impl DirectoryService {
    pub fn new(repo: DirectoryRepository) -> Self {
        Self { repo }
    }

    // --- Clientes ---

    pub async fn list_customers<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_customers(executor).await
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_customer(executor, id).await
    }

    pub async fn create_customer<'e, E>(&self, executor: E, payload: &CustomerPayload) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_customer(executor, payload).await
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_customer(executor, id, payload).await
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_customer(executor, id).await
    }

    // --- Equipamentos ---

    pub async fn list_assets<'e, E>(&self, executor: E) -> Result<Vec<Asset>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_assets(executor).await
    }

    pub async fn get_asset<'e, E>(&self, executor: E, id: Uuid) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_asset(executor, id).await
    }

    pub async fn create_asset<'e, E>(&self, executor: E, payload: &AssetPayload) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Equipamento nasce disponível ou em manutenção, nunca locado
        if payload.status == Some(AssetStatus::Rented) {
            return Err(AppError::AssetStatusLocked);
        }
        self.repo.create_asset(executor, payload).await
    }

    /// Edição livre do cadastro. O status "locado" só muda pelas locações.
    pub async fn update_asset<'e, E>(&self, executor: E, id: Uuid, payload: &AssetPayload) -> Result<Asset, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.get_asset_for_update(&mut *tx, id).await?;
        let next_status = payload.status.unwrap_or(current.status);
        if !current.can_change_status_to(next_status) {
            return Err(AppError::AssetStatusLocked);
        }

        let asset = self
            .repo
            .update_asset(&mut *tx, id, payload.code.trim(), payload.model.as_deref(), next_status)
            .await?;

        tx.commit().await?;
        Ok(asset)
    }

    pub async fn delete_asset<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let asset = self.repo.get_asset_for_update(&mut *tx, id).await?;
        if !asset.can_be_deleted() {
            return Err(AppError::AssetRented);
        }
        self.repo.delete_asset(&mut *tx, id).await?;

        tx.commit().await?;
        tracing::info!(asset_id = %id, code = %asset.code, "Equipamento excluído");
        Ok(())
    }
}
