pub mod board;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod store;
pub mod summary;
pub mod sync;
pub mod tui;
pub mod utils;

pub use board::Board;
pub use config::{Backend, Config};
pub use models::{DailyReport, Task, TaskStatus};
pub use utils::Profile;
