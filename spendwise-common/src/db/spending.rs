use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::sql_types::{BigInt, Date, Integer, Text};
use diesel::{dsl, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::db::{DaoError, DbAsyncPool};
use crate::ledger::{self, SpendingAggregator, UNCATEGORIZED_LABEL};
use crate::models::spending::{SpendingByCategory, SpendingByWeek, WeekTotal};
use crate::schema::items as item_fields;
use crate::schema::items::dsl::items;

const SPENDING_BY_CATEGORY_QUERY: &str = "
    SELECT COALESCE(c.name, $4) AS label, SUM(i.total_cost) AS total
    FROM items i
    LEFT JOIN categories c ON i.category_id = c.id AND c.user_id = i.user_id
    WHERE i.user_id = $1 AND i.purchased_date BETWEEN $2 AND $3
    GROUP BY label
    ORDER BY total DESC, label ASC";

// Subtracting the day-of-week (Sunday = 0) from a date yields the Sunday that starts its week
const SPENDING_BY_WEEK_QUERY: &str = "
    SELECT (i.purchased_date - EXTRACT(DOW FROM i.purchased_date)::INTEGER) AS week_start,
        SUM(i.total_cost) AS total
    FROM items i
    WHERE i.user_id = $1 AND i.purchased_date BETWEEN $2 AND $3
    GROUP BY week_start
    ORDER BY week_start DESC
    LIMIT $4";

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
impl SpendingAggregator for Dao {
    async fn total_in_range(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let total = items
            .select(dsl::sum(item_fields::total_cost))
            .filter(item_fields::user_id.eq(user_id))
            .filter(item_fields::purchased_date.between(start, end))
            .get_result::<Option<f64>>(&mut conn)
            .await?;

        Ok(total.unwrap_or(0.0))
    }

    async fn spending_by_category(
        &self,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SpendingByCategory>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let totals = diesel::sql_query(SPENDING_BY_CATEGORY_QUERY)
            .bind::<Integer, _>(user_id)
            .bind::<Date, _>(start)
            .bind::<Date, _>(end)
            .bind::<Text, _>(UNCATEGORIZED_LABEL)
            .load::<SpendingByCategory>(&mut conn)
            .await?;

        Ok(totals)
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

        let mut conn = self.db_async_pool.get().await?;

        let week_totals = diesel::sql_query(SPENDING_BY_WEEK_QUERY)
            .bind::<Integer, _>(user_id)
            .bind::<Date, _>(window_start)
            .bind::<Date, _>(today)
            .bind::<BigInt, _>(i64::from(number_of_weeks))
            .load::<WeekTotal>(&mut conn)
            .await?;

        Ok(ledger::label_week_totals(week_totals))
    }
}
