use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use theoldreader::api::endpoints;
use theoldreader::config::Config;
use theoldreader::{Client, Headers, Params, Response};

/// Get the config directory path (~/.config/theoldreader/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("theoldreader"))
}

/// Parse a `key=value` argument.
fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[derive(Parser, Debug)]
#[command(name = "theoldreader", about = "Command-line client for The Old Reader API")]
struct Args {
    /// Config file (defaults to ~/.config/theoldreader/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Auth token (overrides THEOLDREADER_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API host, optionally with a port
    #[arg(long, global = true)]
    host: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the auth token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Client name reported to the server
        #[arg(long)]
        client: Option<String>,
    },
    /// Call an endpoint by identifier
    Call {
        /// Endpoint identifier, e.g. `unread-count` or `/reader/atom`
        endpoint: String,
        /// Request parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        /// Extra header as name=value (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,
    },
    /// List the endpoint catalogue
    Endpoints,
}

fn print_response(response: Response) -> Result<()> {
    match response {
        Response::Json(value) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to format JSON")?
            );
        }
        Response::Text(text) => println!("{text}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Command::Endpoints = args.command {
        for endpoint in endpoints::all() {
            let accepts = endpoint
                .allowed_params()
                .map(|names| names.join(", "))
                .unwrap_or_else(|| "*".to_string());
            println!("{:<5} {:<30} {}", endpoint.verb(), endpoint.id(), accepts);
        }
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    tracing::debug!(config = ?config, "Configuration resolved");

    let mut options = config.client_options();
    if let Some(host) = &args.host {
        options.host = host.clone();
    }
    if args.insecure {
        tracing::warn!(host = %options.host, "Using plain HTTP");
        options.use_ssl = false;
    }

    // CLI flag, then env var, then config file
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("THEOLDREADER_TOKEN").ok())
        .or(config.token.clone());

    let mut client =
        Client::with_options(token, options).context("Failed to create API client")?;

    match args.command {
        Command::Login {
            email,
            password,
            client: client_name,
        } => {
            client
                .login(&email, &password, client_name.as_deref())
                .await
                .context("Login failed")?;
            if let Some(token) = client.token() {
                println!("{token}");
            }
        }
        Command::Call {
            endpoint,
            params,
            headers,
        } => {
            let params: Params = params.into_iter().collect();
            let headers: Headers = headers.into_iter().collect();
            let response = client
                .call(&endpoint, &params, &headers)
                .await
                .with_context(|| format!("Call to '{endpoint}' failed"))?;
            print_response(response)?;
        }
        Command::Endpoints => {}
    }

    Ok(())
}
