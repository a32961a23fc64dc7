//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::models::Role;

#[derive(Parser)]
#[command(name = "twiq")]
#[command(about = "Twiq backend: API server, admin portal and database setup")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create tables and indexes, then seed roles and the default mascot
    Init,
    /// Run a server
    #[command(subcommand)]
    Serve(ServeCommands),
    /// Show the effective configuration with secrets masked
    Config,
    /// Give an existing user the admin, writer or user role
    GrantRole {
        /// Phone number the user signed up with
        phone: String,
        #[arg(value_enum)]
        role: RoleArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Writer,
    User,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Writer => Self::Writer,
            RoleArg::User => Self::User,
        }
    }
}

#[derive(Subcommand)]
pub enum ServeCommands {
    /// Start the mobile app API
    Api {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS even if the config enables it
        #[arg(long, action = clap::ArgAction::SetTrue)]
        no_cors: bool,
    },
    /// Start the admin portal
    Portal {
        /// Host to bind to (defaults to portal.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (defaults to portal.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
