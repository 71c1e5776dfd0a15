//! Journey state machine

pub mod context;
pub mod engine;
pub mod graph;
pub mod handler;
pub mod validator;

pub use context::*;
pub use engine::*;
pub use graph::*;
pub use handler::*;
pub use validator::*;
