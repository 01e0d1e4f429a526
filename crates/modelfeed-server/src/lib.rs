pub mod configuration;
pub mod logging;
pub mod refresh;
pub mod routes;
pub mod state;

pub use state::*;
