use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::schema::categories;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCategory<'a> {
    pub user_id: i32,
    pub name: &'a str,
}
