use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{header_pair, HeaderName, HeaderValue, RequestOptions, ResourceClient};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, DEFAULT_SETTINGS_FILE};

/// Mirror a REST collection locally and apply one operation to it.
#[derive(Parser, Debug)]
#[command(name = "rest-sync")]
struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    base_url: Option<String>,
    /// Extra request header, `NAME:VALUE`. Repeatable.
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(HeaderName, HeaderValue)>,
    /// JSON file holding the starting collection (an array).
    #[arg(long)]
    initial: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the collection with the server's view.
    Get { target: String },
    /// Create one item, or several with `--list`.
    Post {
        target: String,
        #[command(flatten)]
        body: BodyArgs,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        list: bool,
    },
    /// Create or update through PUT.
    Put {
        target: String,
        #[command(flatten)]
        body: BodyArgs,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete and drop the echoed identifier locally.
    Delete {
        target: String,
        #[arg(long)]
        identifier: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct BodyArgs {
    #[arg(long)]
    body: Option<String>,
    #[arg(long)]
    body_file: Option<PathBuf>,
}

impl BodyArgs {
    fn read(&self) -> Result<Vec<u8>> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(body.clone().into_bytes()),
            (None, Some(path)) => {
                fs::read(path).with_context(|| format!("failed to read body file {}", path.display()))
            }
            (None, None) => bail!("either --body or --body-file is required"),
        }
    }
}

fn parse_header(raw: &str) -> std::result::Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("header name missing in '{raw}'"));
    }
    header_pair(name, value).map_err(|e| e.to_string())
}

fn read_initial(path: Option<&Path>) -> Result<Vec<Value>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read initial items {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("initial items in {} must be a JSON array", path.display()))
}

fn request_options(content_type: Option<&str>) -> Result<RequestOptions> {
    let options = RequestOptions::new();
    match content_type {
        Some(content_type) => Ok(options.content_type(content_type)?),
        None => Ok(options),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = settings.client_config(args.base_url.as_deref(), &args.headers)?;
    let initial = read_initial(args.initial.as_deref())?;
    let client: ResourceClient<Value> = ResourceClient::new(initial, config);
    info!(
        base_url = ?client.config().base_url.as_ref().map(|url| url.as_str()),
        items = client.state().len(),
        "rest-sync: client ready"
    );

    let state = match args.command {
        Command::Get { target } => client.get_data(&target, RequestOptions::new()).await,
        Command::Post {
            target,
            body,
            content_type,
            list,
        } => {
            let body = body.read()?;
            let options = request_options(content_type.as_deref())?;
            client
                .post_data(&target, options, body, list)
                .await
        }
        Command::Put {
            target,
            body,
            content_type,
        } => {
            let body = body.read()?;
            let options = request_options(content_type.as_deref())?;
            client
                .put_data(&target, options, body)
                .await
        }
        Command::Delete { target, identifier } => {
            let identifier = identifier.unwrap_or_else(|| settings.identifier_field.clone());
            client
                .delete_data(&target, &identifier, RequestOptions::new())
                .await
        }
    };

    println!("{}", serde_json::to_string_pretty(&state)?);
    if let Some(message) = state.error_message() {
        bail!("request failed: {message}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
