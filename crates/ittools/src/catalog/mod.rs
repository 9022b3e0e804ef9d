//! Tool catalog and per-user favorites.

mod favorites;
mod models;
mod tools;

pub use favorites::FavoriteRepository;
pub use models::{NewTool, Tool};
pub use tools::ToolRepository;
