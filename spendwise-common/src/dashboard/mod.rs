use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::DaoError;
use crate::ledger::{BudgetStore, SpendingAggregator};
use crate::models::budget::Budget;
use crate::week::{self, WeekRange};

const SUMMARY_FALLBACK_DAYS: i64 = 7;
const PIE_CHART_DAYS: i64 = 30;
const BAR_CHART_WEEKS: u32 = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_spent: f64,
    pub budget: f64,
    pub remaining: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub pie_series: Vec<ChartPoint>,
    pub bar_series: Vec<ChartPoint>,
}

#[derive(Debug)]
pub enum BudgetError {
    InvalidAmount(f64),
    Persistence(DaoError),
}

impl std::error::Error for BudgetError {}

impl fmt::Display for BudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetError::InvalidAmount(amount) => {
                write!(f, "BudgetError: Amount must be greater than zero, got {amount}")
            }
            BudgetError::Persistence(e) => write!(f, "BudgetError: {e}"),
        }
    }
}

impl From<DaoError> for BudgetError {
    fn from(error: DaoError) -> Self {
        BudgetError::Persistence(error)
    }
}

/// Spending against the budget active on `today`. Without a budget, spending is totaled over
/// the seven days ending `today` and the budget counts as zero.
pub async fn summary(
    budget_store: &dyn BudgetStore,
    aggregator: &dyn SpendingAggregator,
    user_id: i32,
    today: NaiveDate,
) -> Result<Summary, DaoError> {
    let (budget, start, end) = match budget_store.get_active_budget(user_id, today).await? {
        Some(b) => (b.amount, b.start_date, b.end_date),
        None => {
            let (start, end) = week::trailing_days(today, SUMMARY_FALLBACK_DAYS);
            (0.0, start, end)
        }
    };

    let total_spent = aggregator.total_in_range(user_id, start, end).await?;

    Ok(Summary {
        total_spent,
        budget,
        remaining: budget - total_spent,
    })
}

/// Pie series over the last 30 days by category, bar series over the last 4 weeks. The windows
/// are independent of the summary's budget window.
pub async fn charts(
    aggregator: &dyn SpendingAggregator,
    user_id: i32,
    today: NaiveDate,
) -> Result<Charts, DaoError> {
    let (pie_start, pie_end) = week::trailing_days(today, PIE_CHART_DAYS);

    let by_category = aggregator
        .spending_by_category(user_id, pie_start, pie_end)
        .await?;
    let by_week = aggregator
        .spending_by_week(user_id, BAR_CHART_WEEKS, today)
        .await?;

    Ok(Charts {
        pie_series: by_category
            .into_iter()
            .map(|c| ChartPoint {
                label: c.label,
                value: c.total,
            })
            .collect(),
        bar_series: by_week
            .into_iter()
            .map(|w| ChartPoint {
                label: w.week_label,
                value: w.total,
            })
            .collect(),
    })
}

pub async fn set_budget_for_current_week(
    budget_store: &dyn BudgetStore,
    user_id: i32,
    amount: f64,
    today: NaiveDate,
) -> Result<Budget, BudgetError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(BudgetError::InvalidAmount(amount));
    }

    let week = WeekRange::containing(today);
    let budget = budget_store
        .upsert_budget_for_week(user_id, week, amount)
        .await?;

    Ok(budget)
}
