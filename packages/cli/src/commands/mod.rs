pub mod catalog;
pub mod replay;

pub use catalog::{catalog, CatalogArgs};
pub use replay::{replay, ReplayArgs};
