pub mod api;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod model;
pub mod session;

pub use interpreter::{Intent, Interpretation, Mutation, interpret};
pub use session::ChatSession;
