pub mod angle_generator;
pub mod prompts;
pub mod session_manager;

pub use angle_generator::{AngleGenerator, DraftGenerator};
pub use session_manager::SessionManager;
