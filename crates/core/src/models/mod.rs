pub mod holding;
pub mod profit;
pub mod refresh;
pub mod settings;
