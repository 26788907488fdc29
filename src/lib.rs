pub mod config;
pub mod convert;
pub mod error;
pub mod kube;
pub mod log;
pub mod output;
pub mod plan;
pub mod process;
pub mod steps;
