// src/config.rs

use std::{env, time::Duration};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{CatalogRepository, DirectoryRepository, FinanceRepository, OrderRepository, RentalRepository, ReportRepository},
    services::{
        catalog_service::CatalogService, directory_service::DirectoryService,
        finance_service::FinanceService, order_service::OrderService,
        rental_service::RentalService, report_service::ReportService,
    },
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    // Fuso do negócio: define o "hoje" dos relatórios e dos atrasos
    pub business_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_secs = parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 3u64)?;
        let offset_hours = parse_or(&lookup, "BUSINESS_UTC_OFFSET_HOURS", -3i32)?;

        let business_offset = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or_else(|| anyhow!("BUSINESS_UTC_OFFSET_HOURS fora do intervalo: {offset_hours}"))?;

        Ok(Self {
            database_url,
            server_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            business_offset,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("valor inválido para {key} ({raw}): {e}")),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,
    pub catalog_service: CatalogService,
    pub directory_service: DirectoryService,
    pub rental_service: RentalService,
    pub order_service: OrderService,
    pub finance_service: FinanceService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let catalog_repo = CatalogRepository::new();
        let directory_repo = DirectoryRepository::new();
        let rental_repo = RentalRepository::new();
        let order_repo = OrderRepository::new();
        let finance_repo = FinanceRepository::new();
        let report_repo = ReportRepository::new();

        let catalog_service = CatalogService::new(catalog_repo);
        let directory_service = DirectoryService::new(directory_repo.clone());
        let rental_service = RentalService::new(rental_repo, directory_repo, config.business_offset);
        let order_service = OrderService::new(
            order_repo,
            catalog_service.clone(),
            rental_service.clone(),
            config.business_offset,
        );
        let finance_service = FinanceService::new(finance_repo.clone(), config.business_offset);
        let report_service = ReportService::new(report_repo, finance_repo, config.business_offset);

        Ok(Self {
            db_pool,
            config,
            i18n_store: I18nStore::new()?,
            catalog_service,
            directory_service,
            rental_service,
            order_service,
            finance_service,
            report_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/chopp")])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.business_offset, FixedOffset::west_opt(3 * 3600).unwrap());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/chopp"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/chopp"),
            ("BUSINESS_UTC_OFFSET_HOURS", "40"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/chopp"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("BUSINESS_UTC_OFFSET_HOURS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.business_offset.local_minus_utc(), 0);
    }
}
