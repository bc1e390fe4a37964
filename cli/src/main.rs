//! Chirpy credential and token operator tool
//!
//! ```sh
//! # Hash a password for seeding an account (reads stdin when omitted)
//! chirpy-auth hash-password 'correct horse'
//!
//! # Mint and inspect access tokens with the configured secret
//! chirpy-auth mint-token 3f1c...-uuid --ttl-secs 600
//! chirpy-auth verify-token eyJhbGciOi...
//!
//! # Validate config without doing anything else
//! chirpy-auth --config /etc/chirpy/config.toml check
//! ```

use std::io::BufRead;
use std::path::PathBuf;

use chirpy_auth::auth::{
    generate_refresh_token, hash_password, mint_access_token, verify_access_token,
    verify_password,
};
use chirpy_auth::config::{default_config_path, AppConfig, LoggingConfig};
use chirpy_auth::telemetry::init_tracing;
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use uuid::Uuid;

/// Chirpy credential tool: hashes passwords and mints/inspects tokens.
#[derive(Parser, Debug)]
#[command(name = "chirpy-auth", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CHIRPY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a password with the fixed Argon2id parameters.
    HashPassword {
        /// Password; read from stdin when omitted.
        password: Option<String>,
    },
    /// Check a password against a stored credential.
    VerifyPassword {
        credential: String,
        /// Password; read from stdin when omitted.
        password: Option<String>,
    },
    /// Mint an access token for an account.
    MintToken {
        account_id: Uuid,
        /// Lifetime in seconds (defaults to the configured TTL).
        #[arg(long, allow_negative_numbers = true)]
        ttl_secs: Option<i64>,
    },
    /// Verify an access token and print its account ID.
    VerifyToken { token: String },
    /// Generate a new opaque refresh token.
    NewRefreshToken,
    /// Validate the configuration file and exit.
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(&LoggingConfig {
        level: cli.log_level.clone().unwrap_or_else(|| "warn".to_string()),
        ..LoggingConfig::default()
    })?;

    match cli.command {
        Command::HashPassword { ref password } => {
            let password = password_or_stdin(password.clone())?;
            println!("{}", hash_password(&password)?);
        }
        Command::VerifyPassword {
            ref credential,
            ref password,
        } => {
            let password = password_or_stdin(password.clone())?;
            if verify_password(&password, credential)? {
                println!("match");
            } else {
                println!("no match");
                std::process::exit(1);
            }
        }
        Command::MintToken {
            account_id,
            ttl_secs,
        } => {
            let settings = load_config(&cli)?.auth_settings()?;
            let ttl = match ttl_secs {
                Some(secs) => chrono::Duration::try_seconds(secs)
                    .ok_or_else(|| format!("--ttl-secs {} is out of range", secs))?,
                None => settings.access_token_ttl,
            };
            let token = mint_access_token(account_id, &settings.secret, ttl)?;
            println!(
                "{}",
                serde_json::json!({
                    "access_token": token,
                    "token_type": "Bearer",
                    "expires_in": ttl.num_seconds(),
                })
            );
        }
        Command::VerifyToken { ref token } => {
            let settings = load_config(&cli)?.auth_settings()?;
            match verify_access_token(token, &settings.secret) {
                Ok(account_id) => println!("{}", account_id),
                Err(e) => {
                    error!(kind = e.kind(), "token rejected");
                    return Err(e.into());
                }
            }
        }
        Command::NewRefreshToken => {
            println!("{}", generate_refresh_token());
        }
        Command::Check => {
            let config_path = config_path(&cli);
            let config = load_config(&cli)?;
            println!("Configuration is valid");
            println!("   Config file      : {}", config_path.display());
            println!("   Access token TTL : {}s", config.security.access_token_ttl_secs);
            println!("   Refresh TTL      : {}d", config.security.refresh_token_ttl_days);
            println!("   Log level        : {}", config.logging.level);
            println!("   Log format       : {}", config.logging.format);
        }
    }

    Ok(())
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(default_config_path)
}

/// Config file if present, environment otherwise
fn load_config(cli: &Cli) -> Result<AppConfig, chirpy_auth::ConfigError> {
    let path = config_path(cli);
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        AppConfig::load(&path)
    } else {
        debug!("{} not found, using environment", path.display());
        AppConfig::from_env()
    }
}

fn password_or_stdin(password: Option<String>) -> std::io::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}
