// src/extractors/mod.rs
pub mod blocks;
pub mod heading_total;
pub mod record;

// Re-export key extraction types for convenience
pub use blocks::BlockExtractor;
pub use heading_total::HeadingTotalExtractor;
pub use record::LongRecord;
