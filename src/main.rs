use clap::Parser;
use twiq::cli::Cli;
use twiq::cli::Commands;
use twiq::cli::ServeCommands;
use twiq::AppConfig;
use twiq::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so `[logging].level` applies
    let config = AppConfig::load()?;

    if cli.verbose {
        twiq::logging::init_logging_with_level("debug")?;
    } else {
        twiq::logging::init_logging_with_config(Some(&config))?;
    }
    tracing::debug!("Configuration loaded successfully");

    match cli.command {
        Commands::Init => {
            twiq::cli::handle_init_command(&config).await?;
        }
        Commands::Serve(serve_command) => match serve_command {
            ServeCommands::Api {
                host,
                port,
                no_cors,
            } => {
                twiq::cli::handle_serve_api(&config, host, port, no_cors).await?;
            }
            ServeCommands::Portal { host, port } => {
                twiq::cli::handle_serve_portal(&config, host, port).await?;
            }
        },
        Commands::Config => {
            twiq::cli::handle_config_command(&config)?;
        }
        Commands::GrantRole { phone, role } => {
            twiq::cli::handle_grant_role_command(&config, &phone, role.into()).await?;
        }
    }

    Ok(())
}
