//! Command-line argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Instagram content analyzer and downloader.
#[derive(Parser, Debug)]
#[command(
    name = "insta-downloader",
    version,
    about = "Analyze and download public Instagram content",
    long_about = "Resolve Instagram post, reel, profile and story URLs into their download options,\n\
                  then stream the chosen asset to disk or serve both operations over HTTP."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true, default_value = "config.toml", env = "IGDL_CONFIG")]
    pub config: PathBuf,

    /// Browser user agent string.
    #[arg(long = "user-agent", global = true, env = "IGDL_USER_AGENT")]
    pub user_agent: Option<String>,

    /// GraphQL document id for post queries.
    #[arg(long = "doc-id", global = true, env = "IGDL_DOC_ID")]
    pub graphql_doc_id: Option<String>,

    /// Disable the analyze result cache.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:8001.
        #[arg(short, long, env = "IGDL_BIND")]
        bind: Option<String>,

        /// Allowed CORS origin (repeatable).
        #[arg(long = "allow-origin", env = "IGDL_ALLOWED_ORIGINS", value_delimiter = ',')]
        allowed_origins: Vec<String>,
    },

    /// Show what a URL points to and how it can be downloaded.
    Analyze {
        /// Instagram URL.
        url: String,

        /// Print the descriptor as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Download one asset of a URL.
    Download {
        /// Instagram URL.
        url: String,

        /// Download option key, e.g. image, video, carousel_item_2.
        #[arg(short = 't', long = "type")]
        download_type: String,

        /// Base directory for downloads.
        #[arg(short = 'd', long = "directory", env = "IGDL_DOWNLOAD_DIR")]
        download_directory: Option<PathBuf>,

        /// Hide download progress information.
        #[arg(long, short)]
        quiet: bool,
    },
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(user_agent) = &self.user_agent {
            config.upstream.user_agent = user_agent.clone();
        }

        if let Some(doc_id) = &self.graphql_doc_id {
            config.upstream.graphql_doc_id = doc_id.clone();
        }

        if self.no_cache {
            config.cache.enabled = false;
        }

        match &self.command {
            Command::Serve {
                bind,
                allowed_origins,
            } => {
                if let Some(bind) = bind {
                    config.server.bind_addr = bind.clone();
                }
                if !allowed_origins.is_empty() {
                    config.server.allowed_origins = allowed_origins.clone();
                }
            }
            Command::Analyze { .. } => {}
            Command::Download {
                download_directory,
                quiet,
                ..
            } => {
                if let Some(dir) = download_directory {
                    config.output.download_directory = Some(dir.clone());
                }
                if *quiet {
                    config.output.show_progress = false;
                }
            }
        }
    }
}
