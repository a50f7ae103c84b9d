pub mod app;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod handlers;
pub mod history;
pub mod models;
pub mod poller;
pub mod query;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
