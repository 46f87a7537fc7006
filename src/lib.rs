//! Homework scoreboard: discovers per-assignment spreadsheets, classifies each
//! student's result, and serves a ranked, cached roster.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod risk;
pub mod server;
pub mod workbook;

pub use cache::SnapshotStore;
pub use config::Config;
pub use error::SheetError;
pub use models::{AssignmentFile, CellValue, Outcome, ResultOutcome, Snapshot, Status, StudentRecord};
