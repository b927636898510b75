// src/models/rentals.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Active,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub customer_id: Uuid,
    pub rented_at: DateTime<Utc>,
    #[schema(value_type = String, format = Date, example = "2026-10-20")]
    pub expected_return_date: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: RentalStatus,
}

impl Rental {
    /// "Atrasada" é derivado, nunca gravado: ativa e com devolução prevista antes de hoje.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.status, self.expected_return_date, today)
    }
}

pub fn is_overdue(status: RentalStatus, expected_return_date: NaiveDate, today: NaiveDate) -> bool {
    status == RentalStatus::Active && expected_return_date < today
}

// Linha da listagem de locações (JOIN com cliente e equipamento)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub rental: Rental,
    #[schema(example = "João da Silva")]
    pub customer_name: Option<String>,
    #[schema(example = "CH-001")]
    pub asset_code: Option<String>,
    pub asset_model: Option<String>,
    // Preenchido no service, depende do "hoje" do negócio
    #[sqlx(skip)]
    pub is_overdue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn active_rental_past_expected_date_is_overdue() {
        let today = day(2026, 10, 16);
        assert!(is_overdue(RentalStatus::Active, day(2026, 10, 15), today));
        assert!(!is_overdue(RentalStatus::Active, day(2026, 10, 16), today));
        assert!(!is_overdue(RentalStatus::Active, day(2026, 10, 17), today));
    }

    #[test]
    fn returned_rental_is_never_overdue() {
        assert!(!is_overdue(RentalStatus::Returned, day(2020, 1, 1), day(2026, 10, 16)));
    }
}
