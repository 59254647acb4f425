pub mod budget;
pub mod category;
pub mod item;
pub mod spending;
