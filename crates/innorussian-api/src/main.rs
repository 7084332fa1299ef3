//! innorussian-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API over HTTP.
//!
//! # Staff accounts
//!
//! Content management needs a staff account. Create one with:
//!
//! ```
//! cargo run -p innorussian-api --bin innorussian-server -- --create-staff admin@example.com
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use innorussian_api::{
  AppState, ServerConfig,
  auth::{MIN_PASSWORD_LEN, hash_password, normalize_email},
};
use innorussian_core::{model::NewUser, store::VocabularyStore};
use innorussian_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "InnoRussian vocabulary server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create a staff account with this e-mail (password read from stdin)
  /// and exit.
  #[arg(long, value_name = "EMAIL")]
  create_staff: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("store_path", "innorussian.db")?
    .set_default("media_root", "media")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("INNORUSSIAN"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.media_root = expand_tilde(&server_cfg.media_root);

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  if let Some(email) = cli.create_staff {
    return create_staff(&store, &email).await;
  }

  tokio::fs::create_dir_all(&server_cfg.media_root)
    .await
    .with_context(|| format!("failed to create {:?}", server_cfg.media_root))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg);
  let app = innorussian_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn create_staff(store: &SqliteStore, email: &str) -> anyhow::Result<()> {
  let password = read_password()?;
  if password.chars().count() < MIN_PASSWORD_LEN {
    anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
  }
  let password_hash =
    hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;

  let user = store
    .add_user(NewUser {
      email: normalize_email(email),
      password_hash,
      is_staff: true,
    })
    .await
    .context("failed to create staff account")?;

  tracing::info!(user_id = %user.id, email = %user.email, "staff account created");
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
