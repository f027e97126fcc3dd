use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::io::BufRead;

use backstore::cli::{Cli, Command};
use backstore::{AuthBackend, AuthClient, BackstoreConfig, PropertyBackend, PropertyStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = BackstoreConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("backstore starting ({})", config.base_url());

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let auth = AuthClient::from_config(&config)?;
            let session = auth.sign_in_with_password(&email, &password).await?;
            println!(
                "{} Signed in as {}",
                "✓".green(),
                session.user.email.as_deref().unwrap_or(&session.user.id).cyan()
            );
        }
        Command::Logout => {
            let auth = AuthClient::from_config(&config)?;
            auth.restore();
            auth.sign_out().await?;
            println!("{} Signed out", "✓".green());
        }
        Command::Session => {
            let auth = AuthClient::from_config(&config)?;
            match auth.restore() {
                Some(session) => {
                    println!("User: {}", session.user.id.cyan());
                    if let Some(email) = &session.user.email {
                        println!("  Email: {}", email);
                    }
                    println!("  Role: {}", session.user.role().unwrap_or("-"));
                    if let Some(at) = session.expires_at.and_then(|t| chrono::DateTime::from_timestamp(t, 0)) {
                        println!("  Expires: {}", at.to_rfc3339());
                    }
                }
                None => println!("Not signed in"),
            }
        }
        Command::Properties => {
            let auth = AuthClient::from_config(&config)?;
            let session = auth.restore();
            let store = PropertyStore::from_config(&config)?;
            let properties = store.list_published(session.as_ref()).await?;
            if properties.is_empty() {
                println!("No published properties");
            } else {
                for p in properties {
                    println!("{} {} ({}) {}", p.id.yellow(), p.title, p.city.dimmed(), p.price);
                }
            }
        }
    }

    Ok(())
}
