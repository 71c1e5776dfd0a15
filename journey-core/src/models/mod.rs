//! Data models for journeys and their state graphs

pub mod configuration;
pub mod events;
pub mod journey;
pub mod state;

pub use configuration::*;
pub use events::*;
pub use journey::*;
pub use state::*;
