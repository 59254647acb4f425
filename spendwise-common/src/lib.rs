#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod dashboard;
pub mod db;
pub mod export;
pub mod ledger;
pub mod models;
pub mod schema;
pub mod token;
pub mod week;
