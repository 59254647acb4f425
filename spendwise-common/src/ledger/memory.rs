use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::db::DaoError;
use crate::ledger::{self, BudgetStore, SpendingAggregator, UNCATEGORIZED_LABEL};
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::item::{Item, NewItem};
use crate::models::spending::{SpendingByCategory, SpendingByWeek, WeekTotal};
use crate::week::WeekRange;

#[derive(Default)]
struct Tables {
    budgets: Vec<Budget>,
    categories: Vec<Category>,
    items: Vec<Item>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user_items_in_range(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| {
            i.user_id == user_id && start <= i.purchased_date && i.purchased_date <= end
        })
    }
}

/// Process-local ledger for running the server without Postgres and for tests.
#[derive(Default)]
pub struct MemoryLedger {
    tables: Mutex<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DaoError> {
        self.tables.lock().map_err(|e| {
            log::error!("In-memory ledger is unusable: {e}");
            DaoError::CannotRunQuery("In-memory ledger lock was poisoned")
        })
    }

    pub fn create_category(&self, user_id: i32, name: &str) -> Result<Category, DaoError> {
        let mut tables = self.lock()?;

        let category = Category {
            id: tables.next_id(),
            user_id,
            name: String::from(name),
        };
        tables.categories.push(category.clone());

        Ok(category)
    }

    pub fn delete_category(&self, user_id: i32, category_id: i32) -> Result<(), DaoError> {
        let mut tables = self.lock()?;

        let count_before = tables.categories.len();
        tables
            .categories
            .retain(|c| !(c.id == category_id && c.user_id == user_id));

        if tables.categories.len() == count_before {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        for item in tables.items.iter_mut() {
            if item.category_id == Some(category_id) {
                item.category_id = None;
            }
        }

        Ok(())
    }

    pub fn record_item(
        &self,
        user_id: i32,
        category_id: Option<i32>,
        name: &str,
        quantity: i32,
        unit_price: f64,
        purchased_date: NaiveDate,
    ) -> Result<Item, DaoError> {
        if quantity <= 0 || !unit_price.is_finite() || unit_price < 0.0 {
            return Err(DaoError::CannotRunQuery(
                "Item quantity must be positive and unit price must not be negative",
            ));
        }

        let mut tables = self.lock()?;

        if let Some(category_id) = category_id {
            let category_exists = tables
                .categories
                .iter()
                .any(|c| c.id == category_id && c.user_id == user_id);

            if !category_exists {
                return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
            }
        }

        let new_item = NewItem::new(
            user_id,
            category_id,
            name,
            quantity,
            unit_price,
            purchased_date,
        );

        let item = Item {
            id: tables.next_id(),
            user_id: new_item.user_id,
            category_id: new_item.category_id,
            name: String::from(new_item.name),
            quantity: new_item.quantity,
            unit_price: new_item.unit_price,
            total_cost: new_item.total_cost,
            purchased_date: new_item.purchased_date,
        };
        tables.items.push(item.clone());

        Ok(item)
    }
}

#[async_trait]
impl BudgetStore for MemoryLedger {
    async fn get_active_budget(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<Option<Budget>, DaoError> {
        let tables = self.lock()?;

        let budget = tables
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.start_date <= date && date <= b.end_date)
            .max_by_key(|b| (b.start_date, b.id))
            .cloned();

        Ok(budget)
    }

    async fn upsert_budget_for_week(
        &self,
        user_id: i32,
        week: WeekRange,
        amount: f64,
    ) -> Result<Budget, DaoError> {
        let mut tables = self.lock()?;

        let existing = tables
            .budgets
            .iter_mut()
            .find(|b| b.user_id == user_id && b.start_date == week.start);

        if let Some(budget) = existing {
            budget.amount = amount;
            budget.end_date = week.end;
            return Ok(budget.clone());
        }

        let budget = Budget {
            id: tables.next_id(),
            user_id,
            start_date: week.start,
            end_date: week.end,
            amount,
        };
        tables.budgets.push(budget.clone());

        Ok(budget)
    }
}

#[async_trait]
impl SpendingAggregator for MemoryLedger {
    async fn total_in_range(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, DaoError> {
        let tables = self.lock()?;

        Ok(tables
            .user_items_in_range(user_id, start, end)
            .map(|i| i.total_cost)
            .sum())
    }

    async fn spending_by_category(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingByCategory>, DaoError> {
        let tables = self.lock()?;

        let category_names = tables
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| (c.id, c.name.as_str()))
            .collect::<HashMap<_, _>>();

        let mut totals: HashMap<&str, f64> = HashMap::new();
        for item in tables.user_items_in_range(user_id, start, end) {
            let label = item
                .category_id
                .and_then(|id| category_names.get(&id).copied())
                .unwrap_or(UNCATEGORIZED_LABEL);

            *totals.entry(label).or_insert(0.0) += item.total_cost;
        }

        let mut by_category = totals
            .into_iter()
            .map(|(label, total)| SpendingByCategory {
                label: String::from(label),
                total,
            })
            .collect::<Vec<_>>();

        by_category.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.label.cmp(&b.label))
        });

        Ok(by_category)
    }

    async fn spending_by_week(
        &self,
        user_id: i32,
        number_of_weeks: u32,
        today: NaiveDate,
    ) -> Result<Vec<SpendingByWeek>, DaoError> {
        if number_of_weeks == 0 {
            return Ok(Vec::new());
        }

        let window_start = ledger::weekly_window_start(number_of_weeks, today);

        let tables = self.lock()?;

        let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
        for item in tables.user_items_in_range(user_id, window_start, today) {
            let week_start = WeekRange::containing(item.purchased_date).start;
            *totals.entry(week_start).or_insert(0.0) += item.total_cost;
        }

        let mut week_totals = totals
            .into_iter()
            .map(|(week_start, total)| WeekTotal { week_start, total })
            .collect::<Vec<_>>();

        week_totals.sort_by(|a, b| b.week_start.cmp(&a.week_start));
        week_totals.truncate(number_of_weeks as usize);

        Ok(ledger::label_week_totals(week_totals))
    }
}
