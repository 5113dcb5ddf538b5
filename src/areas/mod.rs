pub mod catalog;
pub mod error;
pub mod geometry;
pub mod resolved;
