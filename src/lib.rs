// Library surface for the driver binary, headless integration tests and reuse.
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod fmc;
pub mod manager;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod submission;
pub mod summary;
pub mod timer;
pub mod util;

pub use error::{CommandError, SessionError, SummaryError};
pub use manager::CompManager;
