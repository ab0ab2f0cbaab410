use std::path::PathBuf;

use admin_panel::config::{load_config, AppConfig, ConfigManager};
use admin_panel::AdminApp;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "admin-cli")]
#[command(about = "Inspection CLI for the admin panel configuration", long_about = None)]
struct Cli {
    /// Application config file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated route table
    Routes,
    /// Print the resolved backend configuration, or the value at PATH (e.g. entities.User.list)
    Config { path: Option<String> },
    /// Validate the configuration and generate the routes
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Routes => {
            let app = AdminApp::from_config(&config)?;
            for route in app.route_table().routes() {
                let methods = if route.methods.is_empty() {
                    "ANY".to_string()
                } else {
                    route.methods.join("|")
                };
                println!("{:<40} {:<10} {:<50} {}", route.name, methods, route.path, route.controller);
            }
        }
        Commands::Config { path } => {
            let manager = ConfigManager::new(config.admin.clone());
            match manager.resolved_config(path.as_deref())? {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => {
                    eprintln!("Error: no configuration at \"{}\"", path.unwrap_or_default());
                    std::process::exit(1);
                }
            }
        }
        Commands::Check => {
            let app = AdminApp::from_config(&config)?;
            println!(
                "Configuration OK: {} entities, {} routes",
                app.config().entity_configs()?.len(),
                app.route_table().len()
            );
        }
    }

    Ok(())
}
