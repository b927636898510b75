// src/services/rental_service.rs

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DirectoryRepository, RentalRepository},
    models::{
        directory::AssetStatus,
        rentals::{Rental, RentalDetail, RentalStatus},
    },
};

// Ciclo de vida da chopeira: disponível -> locada -> disponível.
// Cada transição grava locação e equipamento na mesma transação.
#[derive(Clone)]
pub struct RentalService {
    rental_repo: RentalRepository,
    directory_repo: DirectoryRepository,
    business_offset: FixedOffset,
}

impl RentalService {
    pub fn new(rental_repo: RentalRepository, directory_repo: DirectoryRepository, business_offset: FixedOffset) -> Self {
        Self {
            rental_repo,
            directory_repo,
            business_offset,
        }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.business_offset).date_naive()
    }

    pub async fn create_rental<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        customer_id: Uuid,
        expected_return_date: NaiveDate,
    ) -> Result<Rental, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A trava serializa duas locações simultâneas do mesmo equipamento
        let asset = self.directory_repo.get_asset_for_update(&mut *tx, asset_id).await?;
        if !asset.is_available() {
            return Err(AppError::AssetNotAvailable);
        }

        self.directory_repo
            .set_asset_status(&mut *tx, asset_id, AssetStatus::Rented)
            .await?;

        let rental = self
            .rental_repo
            .insert_rental(&mut *tx, asset_id, customer_id, expected_return_date)
            .await?;

        tx.commit().await?;

        tracing::info!(
            rental_id = %rental.id,
            asset = %asset.code,
            customer_id = %customer_id,
            expected_return = %expected_return_date,
            "Chopeira locada"
        );
        Ok(rental)
    }

    pub async fn return_rental<'e, E>(&self, executor: E, rental_id: Uuid) -> Result<Rental, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let rental = self.rental_repo.get_rental_for_update(&mut *tx, rental_id).await?;
        if rental.status != RentalStatus::Active {
            return Err(AppError::RentalNotActive);
        }

        self.directory_repo.get_asset_for_update(&mut *tx, rental.asset_id).await?;
        let rental = self.rental_repo.mark_returned(&mut *tx, rental_id).await?;
        self.directory_repo
            .set_asset_status(&mut *tx, rental.asset_id, AssetStatus::Available)
            .await?;

        tx.commit().await?;

        tracing::info!(rental_id = %rental.id, asset_id = %rental.asset_id, "Chopeira devolvida");
        Ok(rental)
    }

    pub async fn list_rentals<'e, E>(&self, executor: E, status: Option<RentalStatus>) -> Result<Vec<RentalDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let today = self.today();
        let mut rentals = self.rental_repo.list_rentals(executor, status).await?;
        for detail in &mut rentals {
            detail.is_overdue = detail.rental.is_overdue(today);
        }
        Ok(rentals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::directory::{AssetPayload, CustomerPayload};
    use sqlx::PgPool;

    fn service() -> RentalService {
        RentalService::new(
            RentalRepository::new(),
            DirectoryRepository::new(),
            FixedOffset::west_opt(3 * 3600).unwrap(),
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

    async fn asset_status(pool: &PgPool, id: Uuid) -> AssetStatus {
        DirectoryRepository::new().get_asset(pool, id).await.unwrap().status
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[sqlx::test]
    async fn asset_is_exclusive_until_returned(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let maria = customer(&pool, "Maria").await;
        let chopeira = asset(&pool, "CH-001").await;

        let rental = service.create_rental(&pool, chopeira, joao, day(20)).await.unwrap();
        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(asset_status(&pool, chopeira).await, AssetStatus::Rented);

        let second = service.create_rental(&pool, chopeira, maria, day(21)).await;
        assert!(matches!(second, Err(AppError::AssetNotAvailable)));

        let returned = service.return_rental(&pool, rental.id).await.unwrap();
        assert_eq!(returned.status, RentalStatus::Returned);
        assert!(returned.returned_at.is_some());
        assert_eq!(asset_status(&pool, chopeira).await, AssetStatus::Available);

        let again = service.return_rental(&pool, rental.id).await;
        assert!(matches!(again, Err(AppError::RentalNotActive)));

        let next = service.create_rental(&pool, chopeira, maria, day(22)).await.unwrap();
        assert_eq!(next.customer_id, maria);
    }

    #[sqlx::test]
    async fn second_active_row_for_an_asset_is_refused_by_the_index(pool: PgPool) {
        let repo = RentalRepository::new();
        let joao = customer(&pool, "João").await;
        let chopeira = asset(&pool, "CH-002").await;

        repo.insert_rental(&pool, chopeira, joao, day(20)).await.unwrap();
        let duplicate = repo.insert_rental(&pool, chopeira, joao, day(21)).await;
        assert!(matches!(duplicate, Err(AppError::AssetNotAvailable)));
    }

    #[sqlx::test]
    async fn asset_in_maintenance_cannot_be_rented(pool: PgPool) {
        let joao = customer(&pool, "João").await;
        let chopeira = asset(&pool, "CH-003").await;
        DirectoryRepository::new()
            .set_asset_status(&pool, chopeira, AssetStatus::Maintenance)
            .await
            .unwrap();

        let result = service().create_rental(&pool, chopeira, joao, day(20)).await;
        assert!(matches!(result, Err(AppError::AssetNotAvailable)));
        assert_eq!(asset_status(&pool, chopeira).await, AssetStatus::Maintenance);
    }

    #[sqlx::test]
    async fn overdue_flag_uses_business_today(pool: PgPool) {
        let service = service();
        let joao = customer(&pool, "João").await;
        let late = asset(&pool, "CH-004").await;
        let on_time = asset(&pool, "CH-005").await;

        service.create_rental(&pool, late, joao, day(1) - chrono::Duration::days(400)).await.unwrap();
        service.create_rental(&pool, on_time, joao, day(1) + chrono::Duration::days(400)).await.unwrap();

        let rentals = service.list_rentals(&pool, Some(RentalStatus::Active)).await.unwrap();
        assert_eq!(rentals.len(), 2);
        // Ordenadas pela devolução prevista: a atrasada vem primeiro
        assert!(rentals[0].is_overdue);
        assert!(!rentals[1].is_overdue);
    }
}
