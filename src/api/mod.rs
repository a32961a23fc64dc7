//! HTTP API: routes, session guards, handlers and the error body

pub mod auth;
pub mod error;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::build_router;
pub use server::serve_api;
pub use session::SessionManager;
pub use session::UserSession;
