// src/models/reports.rs

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{
    finance::{Employee, Expense, ExpenseCategory},
    orders::{OrderStatus, OrderSummary},
};

// Janela do relatório: hoje, últimos 7 dias, últimos 30 dias ou tudo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    #[default]
    Month,
    All,
}

impl ReportPeriod {
    fn days_back(self) -> Option<i64> {
        match self {
            ReportPeriod::Day => Some(0),
            ReportPeriod::Week => Some(7),
            ReportPeriod::Month => Some(30),
            ReportPeriod::All => None,
        }
    }

    /// Primeiro dia (calendário local do negócio) incluído na janela.
    pub fn start_date(self, now: DateTime<Utc>, offset: FixedOffset) -> Option<NaiveDate> {
        let today = now.with_timezone(&offset).date_naive();
        self.days_back().map(|days| today - Duration::days(days))
    }

    /// Meia-noite local do primeiro dia, em UTC.
    pub fn window_start(self, now: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
        let start = self.start_date(now, offset)?;
        offset
            .from_local_datetime(&start.and_hms_opt(0, 0, 0)?)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Folha é custo mensal: só entra no lucro das janelas de mês e "tudo".
    pub fn includes_payroll(self) -> bool {
        matches!(self, ReportPeriod::Month | ReportPeriod::All)
    }
}

// Campos do pedido que o relatório usa
#[derive(Debug, Clone, FromRow)]
pub struct OrderFigures {
    pub total_amount: Decimal,
    pub total_liters: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub period: ReportPeriod,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    pub revenue: Decimal,
    pub order_count: i64,
    pub total_liters_sold: Decimal,
    pub average_ticket: Decimal,
    pub total_expenses: Decimal,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub payroll: Decimal,
    pub payroll_included: bool,
    pub net_profit: Decimal,
}

impl FinancialReport {
    pub fn build(
        period: ReportPeriod,
        window_start: Option<DateTime<Utc>>,
        start_date: Option<NaiveDate>,
        orders: &[OrderFigures],
        expenses: &[Expense],
        employees: &[Employee],
    ) -> Self {
        let counted: Vec<&OrderFigures> = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .filter(|o| window_start.is_none_or(|start| o.created_at >= start))
            .collect();

        let revenue: Decimal = counted.iter().map(|o| o.total_amount).sum();
        let total_liters_sold: Decimal = counted.iter().map(|o| o.total_liters).sum();
        let order_count = counted.len() as i64;
        let average_ticket = if order_count > 0 {
            (revenue / Decimal::from(order_count)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let in_window: Vec<&Expense> = expenses
            .iter()
            .filter(|e| start_date.is_none_or(|start| e.date >= start))
            .collect();
        let total_expenses: Decimal = in_window.iter().map(|e| e.amount).sum();
        let expenses_by_category = ExpenseCategory::ALL
            .iter()
            .map(|category| CategoryTotal {
                category: *category,
                total: in_window
                    .iter()
                    .filter(|e| e.category == *category)
                    .map(|e| e.amount)
                    .sum(),
            })
            .collect();

        // Folha não é filtrada pela janela: é sempre a folha atual
        let payroll: Decimal = employees
            .iter()
            .filter(|e| e.is_active)
            .map(|e| e.salary)
            .sum();
        let payroll_included = period.includes_payroll();
        let net_profit = revenue
            - total_expenses
            - if payroll_included { payroll } else { Decimal::ZERO };

        Self {
            period,
            start_date,
            revenue,
            order_count,
            total_liters_sold,
            average_ticket,
            total_expenses,
            expenses_by_category,
            payroll,
            payroll_included,
            net_profit,
        }
    }
}

// --- Painel ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub product_count: i64,
    pub order_count: i64,
    pub pending_deliveries: i64,
    pub active_rentals: i64,
    pub pending_consignments: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub recent_orders: Vec<OrderSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;
    use uuid::Uuid;

    fn dec(v: f64) -> Decimal {
        Decimal::from_f64(v).unwrap()
    }

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn now() -> DateTime<Utc> {
        // 16/10/2026 15:00 em Brasília
        Utc.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap()
    }

    fn order(total: f64, liters: f64, status: OrderStatus, created_at: DateTime<Utc>) -> OrderFigures {
        OrderFigures {
            total_amount: dec(total),
            total_liters: dec(liters),
            status,
            created_at,
        }
    }

    fn expense(amount: f64, category: ExpenseCategory, date: NaiveDate) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "despesa".into(),
            category,
            amount: dec(amount),
            date,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn employee(salary: f64, active: bool) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: "Funcionário".into(),
            role: None,
            salary: dec(salary),
            phone: None,
            is_active: active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn day_window_starts_at_local_midnight() {
        let start = ReportPeriod::Day.window_start(now(), brt()).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap());
        assert_eq!(
            ReportPeriod::Week.start_date(now(), brt()),
            NaiveDate::from_ymd_opt(2026, 10, 9)
        );
        assert_eq!(ReportPeriod::All.window_start(now(), brt()), None);
    }

    #[test]
    fn local_today_differs_from_utc_late_at_night() {
        // 01:00 UTC do dia 17 ainda é dia 16 em Brasília
        let late = Utc.with_ymd_and_hms(2026, 10, 17, 1, 0, 0).unwrap();
        assert_eq!(
            ReportPeriod::Day.start_date(late, brt()),
            NaiveDate::from_ymd_opt(2026, 10, 16)
        );
    }

    #[test]
    fn revenue_skips_cancelled_and_out_of_window_orders() {
        let start = ReportPeriod::Week.window_start(now(), brt());
        let orders = vec![
            order(270.0, 30.0, OrderStatus::Pending, now()),
            order(500.0, 50.0, OrderStatus::Cancelled, now()),
            order(130.0, 20.0, OrderStatus::Consignment, now() - Duration::days(2)),
            order(999.0, 99.0, OrderStatus::Delivered, now() - Duration::days(40)),
        ];
        let report = FinancialReport::build(ReportPeriod::Week, start, None, &orders, &[], &[]);

        assert_eq!(report.revenue, dec(400.0));
        assert_eq!(report.order_count, 2);
        assert_eq!(report.total_liters_sold, dec(50.0));
        assert_eq!(report.average_ticket, dec(200.0));
    }

    #[test]
    fn average_ticket_is_zero_without_orders() {
        let report = FinancialReport::build(ReportPeriod::All, None, None, &[], &[], &[]);
        assert_eq!(report.average_ticket, Decimal::ZERO);
        assert_eq!(report.net_profit, Decimal::ZERO);
    }

    #[test]
    fn expenses_are_grouped_with_every_category_present() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let expenses = vec![
            expense(100.0, ExpenseCategory::Fuel, today),
            expense(50.0, ExpenseCategory::Fuel, today),
            expense(80.0, ExpenseCategory::Delivery, today),
            expense(1000.0, ExpenseCategory::Supplies, today - Duration::days(60)),
        ];
        let start = ReportPeriod::Month.start_date(now(), brt());
        let report = FinancialReport::build(ReportPeriod::Month, None, start, &[], &expenses, &[]);

        assert_eq!(report.total_expenses, dec(230.0));
        assert_eq!(report.expenses_by_category.len(), ExpenseCategory::ALL.len());
        let fuel = report
            .expenses_by_category
            .iter()
            .find(|c| c.category == ExpenseCategory::Fuel)
            .unwrap();
        assert_eq!(fuel.total, dec(150.0));
        let supplies = report
            .expenses_by_category
            .iter()
            .find(|c| c.category == ExpenseCategory::Supplies)
            .unwrap();
        assert_eq!(supplies.total, Decimal::ZERO);
    }

    #[test]
    fn payroll_only_reduces_profit_for_month_and_all() {
        let orders = vec![order(5000.0, 300.0, OrderStatus::Delivered, now())];
        let employees = vec![employee(2000.0, true), employee(1500.0, false)];

        let month = FinancialReport::build(ReportPeriod::Month, None, None, &orders, &[], &employees);
        assert_eq!(month.payroll, dec(2000.0));
        assert!(month.payroll_included);
        assert_eq!(month.net_profit, dec(3000.0));

        let day = FinancialReport::build(ReportPeriod::Day, None, None, &orders, &[], &employees);
        assert_eq!(day.payroll, dec(2000.0));
        assert!(!day.payroll_included);
        assert_eq!(day.net_profit, dec(5000.0));
    }
}
