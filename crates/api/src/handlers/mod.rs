pub mod event;
pub mod file;
pub mod health;
pub mod report;
