//! API request handlers

mod system;
mod tasks;
mod templates;

pub use system::*;
pub use tasks::*;
pub use templates::*;
