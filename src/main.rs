//! Insta Downloader - CLI entry point.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use insta_downloader::{
    api::InstagramApi,
    cli::{Args, Command},
    config::{validate_config, Config},
    content::classify,
    download::{save_to_directory, DownloadProxy},
    error::{exit_codes, Error, ErrorKind, Result},
    output::{
        create_spinner, print_banner, print_descriptor, print_error, print_info,
        print_server_summary, print_success, print_warning,
    },
    resolve::Resolver,
    server,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    match run(args).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            tracing::debug!("{:?}", e);
            if e.kind() == ErrorKind::Internal {
                print_error(&e.to_string());
            } else {
                print_error(&e.user_message());
            }
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

fn exit_code_for(error: &Error) -> i32 {
    match error {
        Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
            exit_codes::CONFIG_ERROR
        }
        _ => match error.kind() {
            ErrorKind::InvalidUrl | ErrorKind::OptionUnavailable => exit_codes::INVALID_INPUT,
            ErrorKind::NotFound | ErrorKind::PrivateContent => exit_codes::CONTENT_UNAVAILABLE,
            ErrorKind::Upstream => exit_codes::UPSTREAM_ERROR,
            ErrorKind::Internal => exit_codes::UNEXPECTED_ERROR,
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args.config)?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    match args.command {
        Command::Serve { .. } => {
            print_banner();
            print_server_summary(&config.server.bind_addr, &config.server.allowed_origins);
            server::serve(&config).await
        }
        Command::Analyze { url, json } => analyze(&config, &url, json).await,
        Command::Download {
            url, download_type, ..
        } => download(&config, &url, &download_type).await,
    }
}

/// Load the given file, else the per-user file, else built-in defaults.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }

    if let Some(user_path) = Config::user_config_path().filter(|p| p.exists()) {
        tracing::debug!("Using configuration from {}", user_path.display());
        return Config::load(&user_path);
    }

    print_warning(&format!(
        "Configuration file not found: {}",
        path.display()
    ));
    print_info("Using default configuration with CLI arguments");
    Ok(Config::default())
}

async fn analyze(config: &Config, url: &str, json: bool) -> Result<()> {
    let reference = classify(url)?;
    let api = InstagramApi::new(&config.upstream)?;
    let resolver = Resolver::new(Arc::new(api), &config.upstream);

    let spinner = (!json).then(|| create_spinner(&format!("Analyzing {}...", reference)));
    let result = resolver.resolve_fresh(&reference).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let descriptor = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else {
        print_descriptor(&descriptor);
    }
    Ok(())
}

async fn download(config: &Config, url: &str, download_type: &str) -> Result<()> {
    let reference = classify(url)?;
    let api = InstagramApi::new(&config.upstream)?;
    let resolver = Arc::new(Resolver::new(Arc::new(api), &config.upstream));
    let proxy = DownloadProxy::new(resolver, &config.upstream);

    print_info(&format!("Downloading {} from {}", download_type, reference));
    let result = proxy.download(&reference, download_type).await?;

    let directory = config.download_directory();
    let path = save_to_directory(result, &directory, config.output.show_progress).await?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}
