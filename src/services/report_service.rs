// src/services/report_service.rs

use chrono::{FixedOffset, Utc};
use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::{FinanceRepository, ReportRepository},
    models::reports::{Dashboard, FinancialReport, ReportPeriod},
};

// Quantos pedidos aparecem no painel
const RECENT_ORDERS: i64 = 5;

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    finance_repo: FinanceRepository,
    business_offset: FixedOffset,
}

impl ReportService {
    pub fn new(repo: ReportRepository, finance_repo: FinanceRepository, business_offset: FixedOffset) -> Self {
        Self {
            repo,
            finance_repo,
            business_offset,
        }
    }

    pub async fn financial_report<'e, E>(&self, executor: E, period: ReportPeriod) -> Result<FinancialReport, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let now = Utc::now();
        let window_start = period.window_start(now, self.business_offset);
        let start_date = period.start_date(now, self.business_offset);

        let mut conn = executor.acquire().await?;
        let orders = self.repo.order_figures(&mut *conn, window_start).await?;
        let expenses = self.finance_repo.list_expenses(&mut *conn, None, start_date).await?;
        let employees = self.finance_repo.list_employees(&mut *conn, true).await?;

        Ok(FinancialReport::build(
            period,
            window_start,
            start_date,
            &orders,
            &expenses,
            &employees,
        ))
    }

    pub async fn dashboard<'e, E>(&self, executor: E) -> Result<Dashboard, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let stats = self.repo.dashboard_stats(&mut *conn).await?;
        let recent_orders = self.repo.recent_orders(&mut *conn, RECENT_ORDERS).await?;

        Ok(Dashboard { stats, recent_orders })
    }
}
