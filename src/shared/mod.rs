pub mod collector;
pub mod error;
pub mod traits;

pub use error::*;
pub use traits::*;
