pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::DaoError;
use crate::models::budget::Budget;
use crate::models::spending::{SpendingByCategory, SpendingByWeek, WeekTotal};
use crate::week::{self, WeekRange};

/// Label used for spending on items that have no category (or whose category was deleted).
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Returns the budget whose interval contains `date`, or `None` if the user has not set one.
    /// When several match, the one with the latest start date (then the highest ID) wins.
    async fn get_active_budget(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<Option<Budget>, DaoError>;

    /// Inserts the user's budget for `week`, or updates the amount and end date of the one
    /// already keyed on `week.start`. Must be atomic with respect to concurrent calls.
    async fn upsert_budget_for_week(
        &self,
        user_id: i32,
        week: WeekRange,
        amount: f64,
    ) -> Result<Budget, DaoError>;
}

#[async_trait]
pub trait SpendingAggregator: Send + Sync {
    /// Sum of the stored total cost of items purchased in `[start, end]`. Zero when none match.
    async fn total_in_range(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, DaoError>;

    /// Spending in `[start, end]` grouped by category name, largest total first.
    async fn spending_by_category(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingByCategory>, DaoError>;

    /// Spending per calendar week over the `number_of_weeks * 7` days ending `today` (inclusive),
    /// most recent week first, with at most `number_of_weeks` rows.
    async fn spending_by_week(
        &self,
        user_id: i32,
        number_of_weeks: u32,
        today: NaiveDate,
    ) -> Result<Vec<SpendingByWeek>, DaoError>;
}

/// Start of the trailing window used for weekly spending.
pub(crate) fn weekly_window_start(number_of_weeks: u32, today: NaiveDate) -> NaiveDate {
    week::trailing_days(today, i64::from(number_of_weeks) * 7).0
}

pub(crate) fn label_week_totals(week_totals: Vec<WeekTotal>) -> Vec<SpendingByWeek> {
    week_totals
        .into_iter()
        .map(|w| SpendingByWeek {
            week_label: WeekRange::containing(w.week_start).label(),
            week_start: w.week_start,
            total: w.total,
        })
        .collect()
}
