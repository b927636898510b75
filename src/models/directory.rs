// src/models/directory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "João da Silva")]
    pub full_name: String,
    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,
    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "João da Silva")]
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// --- EQUIPAMENTO (chopeira) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "asset_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Available,
    Rented,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    #[schema(example = "CH-001")]
    pub code: String,
    #[schema(example = "Chopeira elétrica 2 vias")]
    pub model: Option<String>,
    pub status: AssetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetPayload {
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    #[schema(example = "CH-001")]
    pub code: String,
    pub model: Option<String>,
    // Ausente no cadastro = disponível; ausente na edição = mantém o atual
    pub status: Option<AssetStatus>,
}

impl Asset {
    pub fn is_available(&self) -> bool {
        self.status == AssetStatus::Available
    }

    /// Equipamento locado não pode ser excluído.
    pub fn can_be_deleted(&self) -> bool {
        self.status != AssetStatus::Rented
    }

    /// Edição manual pode alternar entre disponível e manutenção; "locado" pertence às locações.
    pub fn can_change_status_to(&self, next: AssetStatus) -> bool {
        if next == self.status {
            return true;
        }
        self.status != AssetStatus::Rented && next != AssetStatus::Rented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(status: AssetStatus) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            code: "CH-001".into(),
            model: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rented_asset_cannot_be_deleted() {
        assert!(!asset(AssetStatus::Rented).can_be_deleted());
        assert!(asset(AssetStatus::Available).can_be_deleted());
        assert!(asset(AssetStatus::Maintenance).can_be_deleted());
    }

    #[test]
    fn manual_edit_never_touches_rented_state() {
        assert!(asset(AssetStatus::Available).can_change_status_to(AssetStatus::Maintenance));
        assert!(asset(AssetStatus::Maintenance).can_change_status_to(AssetStatus::Available));
        assert!(!asset(AssetStatus::Available).can_change_status_to(AssetStatus::Rented));
        assert!(!asset(AssetStatus::Rented).can_change_status_to(AssetStatus::Available));
        assert!(asset(AssetStatus::Rented).can_change_status_to(AssetStatus::Rented));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AssetStatus::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
    }
}
