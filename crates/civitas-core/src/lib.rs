pub mod analytics;
pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod dimension;
pub mod engagement;
pub mod error;
pub mod event;
pub mod period;
pub mod series;
pub mod store;

mod numeric;
