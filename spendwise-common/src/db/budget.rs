use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::db::{DaoError, DbAsyncPool};
use crate::ledger::BudgetStore;
use crate::models::budget::{Budget, NewBudget};
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;
use crate::week::WeekRange;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }
}

#[async_trait]
impl BudgetStore for Dao {
    async fn get_active_budget(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<Option<Budget>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let budget = budgets
            .filter(budget_fields::user_id.eq(user_id))
            .filter(budget_fields::start_date.le(date))
            .filter(budget_fields::end_date.ge(date))
            .order((budget_fields::start_date.desc(), budget_fields::id.desc()))
            .first::<Budget>(&mut conn)
            .await
            .optional()?;

        Ok(budget)
    }

    async fn upsert_budget_for_week(
        &self,
        user_id: i32,
        week: WeekRange,
        amount: f64,
    ) -> Result<Budget, DaoError> {
        let new_budget = NewBudget {
            user_id,
            start_date: week.start,
            end_date: week.end,
            amount,
        };

        let mut conn = self.db_async_pool.get().await?;

        // The unique (user_id, start_date) constraint makes this a single atomic upsert
        let budget = dsl::insert_into(budgets)
            .values(&new_budget)
            .on_conflict((budget_fields::user_id, budget_fields::start_date))
            .do_update()
            .set((
                budget_fields::amount.eq(amount),
                budget_fields::end_date.eq(week.end),
            ))
            .get_result::<Budget>(&mut conn)
            .await?;

        Ok(budget)
    }
}
