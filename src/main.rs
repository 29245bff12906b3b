use anyhow::Result;
use clap::{Parser, Subcommand};
use skillhub_client::{ApiClient, ClientConfig, Credentials, ReqwestTransport, SessionFlow};
use skillhub_store::SqliteTokenStore;
use skillhub_types::{RequestDescriptor, SessionObserver, TokenKey, TokenStore, Transport};
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(name = "skillhub", about = "skillhub — marketplace API client")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session tokens.
    Login {
        username: String,
        password: String,
    },
    /// End the session and clear stored tokens.
    Logout,
    /// Show whether a session is stored.
    Status,
    /// Issue an authenticated GET and print the response.
    Get {
        /// Backend-relative path, e.g. `/admin/users?page=1`.
        path: String,
    },
}

/// Session observer for the CLI: there is no login surface to redirect to,
/// so terminal auth failures just tell the operator what to do.
struct ReloginNotice;

impl SessionObserver for ReloginNotice {
    fn session_ended(&self) {
        tracing::warn!("session ended; run `skillhub login` to re-authenticate");
    }
}

struct App {
    client: ApiClient,
    flow: SessionFlow,
    store: Arc<dyn TokenStore>,
}

async fn build_app(config: &ClientConfig) -> Result<App> {
    let store: Arc<dyn TokenStore> = Arc::new(SqliteTokenStore::new(&config.database_url).await?);
    let client = ApiClient::from_config(config, Arc::clone(&store), Arc::new(ReloginNotice))?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(http, &config.base_url));
    let flow = SessionFlow::new(transport, Arc::clone(&store), config.auth.clone());
    Ok(App {
        client,
        flow,
        store,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    Ok(match path {
        Some(p) => ClientConfig::from_file(p)?,
        None => ClientConfig::default(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let app = build_app(&config).await?;

    match cli.command {
        Commands::Login { username, password } => {
            app.flow.login(&Credentials::new(username, password)).await?;
            eprintln!("login successful");
        }
        Commands::Logout => {
            app.flow.logout().await?;
            eprintln!("logged out");
        }
        Commands::Status => {
            let access = app.store.get(TokenKey::Access).await?.is_some();
            let refresh = app.store.get(TokenKey::Refresh).await?.is_some();
            println!("access token:  {}", if access { "present" } else { "absent" });
            println!("refresh token: {}", if refresh { "present" } else { "absent" });
        }
        Commands::Get { path } => {
            let response = app.client.send(RequestDescriptor::get(path)).await?;
            eprintln!("status: {}", response.status());
            println!("{}", response.text());
        }
    }
    Ok(())
}
