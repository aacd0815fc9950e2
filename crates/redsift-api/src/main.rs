//! redsift server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers any
//! `REDSIFT_*` environment variables on top, opens the SQLite store, and
//! either serves the trigger API or runs a single job in the foreground.
//!
//! # Setup helpers
//!
//! ```
//! cargo run -p redsift-api --bin server -- hash-secret   # api_key_hash
//! cargo run -p redsift-api --bin server -- gen-key       # pipeline.encryption_key
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use rand_core::OsRng;
use redsift_api::{AppState, Job, JobRunner, ServerConfig, auth::AuthConfig};
use redsift_ollama::OllamaClient;
use redsift_pipeline::{AnalysisCipher, Pipeline, WhatlangDetector};
use redsift_reddit::HttpRedditClient;
use redsift_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

type HarvestPipeline = Pipeline<SqliteStore, HttpRedditClient, OllamaClient, WhatlangDetector>;

#[derive(Parser)]
#[command(author, version, about = "redsift Reddit harvester")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP trigger API (the default).
  Serve,
  /// Print the argon2 hash for an API key entered on stdin and exit.
  HashSecret,
  /// Print a fresh base64 encryption key and exit.
  GenKey,
  /// Collect one post with its comments and authors.
  CollectPost { post_id: String },
  /// Collect the new hot posts of a subreddit.
  CollectSub { sub: String },
  /// Collect an author and their new comments.
  CollectAuthor { author: String },
  /// Collect new comments for every stored author.
  CollectAuthors,
  /// Subscribe to every stored subreddit not yet joined.
  JoinSubs,
  AnalyzePost { post_id: String },
  AnalyzePosts,
  AnalyzeComment { comment_id: String },
  AnalyzeComments,
  /// Collect a post unless already stored, then analyse it.
  GetAndAnalyzePost { post_id: String },
}

impl Command {
  /// The job this command runs once, if any.
  fn into_job(self) -> Option<Job> {
    Some(match self {
      Self::Serve | Self::HashSecret | Self::GenKey => return None,
      Self::CollectPost { post_id } => Job::CollectPost { post_id },
      Self::CollectSub { sub } => Job::CollectSubreddit { subreddit: sub },
      Self::CollectAuthor { author } => Job::CollectAuthor { author },
      Self::CollectAuthors => Job::CollectKnownAuthors,
      Self::JoinSubs => Job::JoinNewSubreddits,
      Self::AnalyzePost { post_id } => Job::AnalyzePost { post_id },
      Self::AnalyzePosts => Job::AnalyzePosts,
      Self::AnalyzeComment { comment_id } => Job::AnalyzeComment { comment_id },
      Self::AnalyzeComments => Job::AnalyzeComments,
      Self::GetAndAnalyzePost { post_id } => Job::GetAndAnalyzePost { post_id },
    })
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let command = cli.command.unwrap_or(Command::Serve);

  // Helper modes that need no configuration.
  match command {
    Command::HashSecret => {
      let secret = read_secret_from_stdin()?;
      let salt = SaltString::generate(&mut OsRng);
      let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
        .to_string();
      println!("{hash}");
      return Ok(());
    }
    Command::GenKey => {
      println!("{}", AnalysisCipher::generate_key());
      return Ok(());
    }
    _ => {}
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REDSIFT").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let pipeline = build_pipeline(&server_cfg).await?;

  if let Some(job) = command.into_job() {
    return pipeline.run(job).await.context("job failed");
  }

  // Build application state.
  let state = AppState {
    runner: Arc::new(pipeline),
    auth:   Arc::new(AuthConfig::new(
      server_cfg.api_key_hash.clone(),
      server_cfg.jwt_identity.clone(),
      &server_cfg.jwt_secret,
    )),
  };

  let app = redsift_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn build_pipeline(cfg: &ServerConfig) -> anyhow::Result<HarvestPipeline> {
  // Expand `~` in store path.
  let store_path = expand_tilde(&cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let reddit = HttpRedditClient::new(cfg.reddit.clone().into())
    .context("failed to build Reddit client")?;

  let backend = OllamaClient::new(&cfg.ollama.url, cfg.ollama.timeout())
    .context("failed to build Ollama client")?;

  if cfg.ollama.models.is_empty() {
    warn!("no models configured; analysis will store nothing");
  }

  let settings = cfg.pipeline.settings(cfg.ollama.models.clone());
  let pipeline = Pipeline::new(store, reddit, backend, WhatlangDetector, settings);
  Ok(match cfg.pipeline.cipher()? {
    Some(cipher) => pipeline.with_cipher(cipher),
    None => pipeline,
  })
}

/// Read a secret from stdin.
fn read_secret_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("API key: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
