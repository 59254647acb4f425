use chrono::NaiveDate;
use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::db::{DaoError, DbAsyncPool};
use crate::models::category::{Category, NewCategory};
use crate::models::item::{Item, NewItem};
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::items::dsl::items;

/// Write path for the rows the aggregator reads. Item costs are fixed here, at write time.
pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    pub async fn create_category(&self, user_id: i32, name: &str) -> Result<Category, DaoError> {
        let new_category = NewCategory { user_id, name };

        let mut conn = self.db_async_pool.get().await?;
        let category = dsl::insert_into(categories)
            .values(&new_category)
            .get_result::<Category>(&mut conn)
            .await?;

        Ok(category)
    }

    /// Items that referenced the category keep their rows; the foreign key nulls the reference.
    pub async fn delete_category(&self, user_id: i32, category_id: i32) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        let affected_row_count = diesel::delete(
            categories.filter(
                category_fields::id
                    .eq(category_id)
                    .and(category_fields::user_id.eq(user_id)),
            ),
        )
        .execute(&mut conn)
        .await?;

        if affected_row_count == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }

    /// Fails with `NotFound` if `category_id` names a category the user doesn't own.
    pub async fn record_item(
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

        let mut conn = self.db_async_pool.get().await?;

        if let Some(category_id) = category_id {
            let category_is_owned = dsl::select(dsl::exists(
                categories
                    .find(category_id)
                    .filter(category_fields::user_id.eq(user_id)),
            ))
            .get_result::<bool>(&mut conn)
            .await?;

            if !category_is_owned {
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

        let item = dsl::insert_into(items)
            .values(&new_item)
            .get_result::<Item>(&mut conn)
            .await?;

        Ok(item)
    }
}
