// src/services/finance_service.rs

use chrono::{FixedOffset, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{Employee, EmployeePayload, Expense, ExpenseCategory, ExpensePayload},
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    business_offset: FixedOffset,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, business_offset: FixedOffset) -> Self {
        Self { repo, business_offset }
    }

    // --- Despesas ---

    pub async fn list_expenses<'e, E>(&self, executor: E, category: Option<ExpenseCategory>) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_expenses(executor, category, None).await
    }

    pub async fn create_expense<'e, E>(&self, executor: E, payload: &ExpensePayload) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Sem data = lançamento de hoje (no fuso do negócio)
        let date = payload
            .date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.business_offset).date_naive());

        let expense = self.repo.create_expense(executor, payload, date).await?;
        tracing::info!(
            expense_id = %expense.id,
            category = ?expense.category,
            amount = %expense.amount,
            "Despesa lançada"
        );
        Ok(expense)
    }

    pub async fn update_expense<'e, E>(&self, executor: E, id: Uuid, payload: &ExpensePayload) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let date = payload
            .date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.business_offset).date_naive());
        self.repo.update_expense(executor, id, payload, date).await
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_expense(executor, id).await
    }

    // --- Funcionários ---

    pub async fn list_employees<'e, E>(&self, executor: E, active_only: bool) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_employees(executor, active_only).await
    }

    pub async fn create_employee<'e, E>(&self, executor: E, payload: &EmployeePayload) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_employee(executor, payload).await
    }

    pub async fn update_employee<'e, E>(&self, executor: E, id: Uuid, payload: &EmployeePayload) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_employee(executor, id, payload).await
    }

    pub async fn toggle_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = self.repo.toggle_employee(executor, id).await?;
        tracing::info!(employee_id = %id, active = employee.is_active, "Situação do funcionário alterada");
        Ok(employee)
    }

    pub async fn delete_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_employee(executor, id).await
    }
}
