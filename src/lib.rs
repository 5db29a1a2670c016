pub mod audit;
pub mod database;
pub mod handlers;
pub mod lifecycle;
pub mod listing;
pub mod notification;
pub mod query;
pub mod scheduler;
pub mod store;
