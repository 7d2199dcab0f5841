//! Spreadsheet access behind the [`SheetsApi`] trait.
//!
//! [`GoogleSheetsClient`] calls the Sheets v4 REST API with a
//! service-account token; [`MemorySheets`] implements the same contract in
//! memory.

pub mod api;
pub mod client;
pub mod error;
pub mod memory;
pub mod models;
pub mod range;

pub use api::SheetsApi;
pub use client::GoogleSheetsClient;
pub use error::SheetsError;
pub use memory::MemorySheets;
pub use models::{
    AppendValuesResponse, BatchUpdateValuesResponse, SpreadsheetInfo, UpdateValuesResponse,
    ValueRange, Values,
};
