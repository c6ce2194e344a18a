pub mod repository;
pub mod store;
pub mod traits;

pub use repository::{BoardData, JsonBoardRepository};
pub use store::*;
pub use traits::*;
