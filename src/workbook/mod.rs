// src/workbook/mod.rs
pub mod layout;
pub mod loader;
pub mod models;

pub use layout::LayoutConfig;
pub use loader::Workbook;
pub use models::RawSheet;
