// src/db/finance_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Employee, EmployeePayload, Expense, ExpenseCategory, ExpensePayload},
};

const EXPENSE: &str = "Despesa";
const EMPLOYEE: &str = "Funcionário";

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn list_expenses<'e, E>(
        &self,
        executor: E,
        category: Option<ExpenseCategory>,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::expense_category IS NULL OR category = $1)
              AND ($2::date IS NULL OR date >= $2)
            ORDER BY date DESC, created_at DESC
            "#,
        )
            .bind(category)
            .bind(since)
            .fetch_all(executor)
            .await?;
        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        data: &ExpensePayload,
        date: NaiveDate,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (description, category, amount, date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(data.description.trim())
            .bind(data.category)
            .bind(data.amount)
            .bind(date)
            .bind(data.notes.as_deref())
            .fetch_one(executor)
            .await?;
        Ok(expense)
    }

    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &ExpensePayload,
        date: NaiveDate,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET description = $2, category = $3, amount = $4, date = $5, notes = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(data.description.trim())
            .bind(data.category)
            .bind(data.amount)
            .bind(date)
            .bind(data.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, EXPENSE))
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(EXPENSE.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    pub async fn list_employees<'e, E>(&self, executor: E, active_only: bool) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE ($1 = FALSE OR is_active) ORDER BY name ASC",
        )
            .bind(active_only)
            .fetch_all(executor)
            .await?;
        Ok(employees)
    }

    pub async fn create_employee<'e, E>(&self, executor: E, data: &EmployeePayload) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, role, salary, phone, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(data.name.trim())
            .bind(data.role.as_deref())
            .bind(data.salary)
            .bind(data.phone.as_deref())
            .bind(data.is_active)
            .fetch_one(executor)
            .await?;
        Ok(employee)
    }

    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &EmployeePayload,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = $2, role = $3, salary = $4, phone = $5, is_active = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(data.name.trim())
            .bind(data.role.as_deref())
            .bind(data.salary)
            .bind(data.phone.as_deref())
            .bind(data.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, EMPLOYEE))
    }

    pub async fn toggle_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            "UPDATE employees SET is_active = NOT is_active WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_db(e, EMPLOYEE))
    }

    pub async fn delete_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(EMPLOYEE.to_string()));
        }
        Ok(())
    }
}
