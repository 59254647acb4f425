use chrono::NaiveDate;
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::models::category::Category;
use crate::schema::items;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Category, foreign_key = category_id))]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i32,
    pub user_id: i32,

    pub category_id: Option<i32>,

    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,

    // Stored at write time. Readers must not derive it from quantity and unit_price.
    pub total_cost: f64,

    pub purchased_date: NaiveDate,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewItem<'a> {
    pub user_id: i32,

    pub category_id: Option<i32>,

    pub name: &'a str,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_cost: f64,

    pub purchased_date: NaiveDate,
}

impl<'a> NewItem<'a> {
    pub fn new(
        user_id: i32,
        category_id: Option<i32>,
        name: &'a str,
        quantity: i32,
        unit_price: f64,
        purchased_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            category_id,
            name,
            quantity,
            unit_price,
            total_cost: f64::from(quantity) * unit_price,
            purchased_date,
        }
    }
}
