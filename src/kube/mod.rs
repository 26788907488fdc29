pub mod config;
pub mod kubectl;
pub mod records;
pub mod selector;
