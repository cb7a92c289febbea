pub mod catalog;
pub mod error;
pub mod filesystem;
pub mod result;

pub use catalog::*;
pub use error::*;
pub use filesystem::*;
pub use result::*;
