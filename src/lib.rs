pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use server::app;
pub use state::AppState;
