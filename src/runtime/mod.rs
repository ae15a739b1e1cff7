pub mod lifetime;
pub mod terminal;

pub use lifetime::startup::{ClientContext, prepare_client_startup};
pub use terminal::TerminalFeedback;
