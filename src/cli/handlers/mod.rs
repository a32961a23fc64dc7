//! CLI command handlers
//!
//! - init: database schema and seed rows
//! - serve: API and portal servers
//! - info: configuration display
//! - users: role grants

pub mod info;
pub mod init;
pub mod serve;
pub mod users;

pub use info::*;
pub use init::*;
pub use serve::*;
pub use users::*;
