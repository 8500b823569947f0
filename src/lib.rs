pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod models;
pub mod mutation;
pub mod nav;
pub mod projector;
pub mod session;
pub mod settings;
pub mod state;
pub mod storage;
pub mod ui;
pub mod weekly;

pub use app::App;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use nav::{Navigator, Route};
pub use session::SessionStore;
pub use state::AppContext;
