use chrono::NaiveDate;
use diesel::sql_types::{Date, Double, Text};
use diesel::QueryableByName;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, QueryableByName)]
pub struct SpendingByCategory {
    #[diesel(sql_type = Text)]
    pub label: String,
    #[diesel(sql_type = Double)]
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingByWeek {
    pub week_label: String,
    pub week_start: NaiveDate,
    pub total: f64,
}

/// Raw per-week row. The label is attached afterwards so every store formats it the same way.
#[derive(Debug, QueryableByName)]
pub struct WeekTotal {
    #[diesel(sql_type = Date)]
    pub week_start: NaiveDate,
    #[diesel(sql_type = Double)]
    pub total: f64,
}
