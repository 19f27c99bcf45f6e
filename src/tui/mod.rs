pub mod app;
pub mod error;
pub mod events;
pub mod layout;
pub mod render;
pub mod theme;
pub mod widgets;

pub use app::{App, Mode};
pub use error::TuiError;
pub use events::{run_event_loop, run_startup_error};
pub use layout::Layout;
pub use render::render;
