//! `storefront-session` — inspect and drive the persisted client session.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use storefront_auth::landing::{can_access_path, landing_route};
use storefront_auth::{RoleGate, RoleId, check_route};
use storefront_client::{
    ApiClient, AuthCompletion, ClientConfig, FileStorage, HistoryNavigator, PlaceholderDirectory,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "storefront-session", about = "Storefront client session tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current session.
    Whoami,
    /// Act as a role locally.
    Login { role: RoleId },
    /// Clear the session and token.
    Logout,
    /// Complete sign-in from an auth provider redirect URL.
    Complete { url: String },
    /// Evaluate the navigation guards for a path.
    Check {
        path: String,
        /// Roles allowed on the route; defaults to the roles owning the path.
        #[arg(long = "allow")]
        allow: Vec<RoleId>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let storage_path = config.resolved_storage_path()?;
    let storage = FileStorage::open(&storage_path)
        .with_context(|| format!("failed to open session storage at {:?}", storage_path))?;

    let session = Arc::new(SessionStore::restore(
        Arc::new(storage),
        Arc::new(PlaceholderDirectory),
    ));
    let navigator = Arc::new(HistoryNavigator::new());

    let output = match cli.command {
        Command::Whoami => json!({
            "session": session.snapshot(),
            "authenticated": session.is_authenticated(),
            "landing": landing_route(session.current_role()),
        }),
        Command::Login { role } => {
            session.switch_role(role);
            json!({ "session": session.snapshot(), "landing": landing_route(role) })
        }
        Command::Logout => {
            session.logout();
            json!({ "session": session.snapshot() })
        }
        Command::Complete { url } => {
            let api = Arc::new(ApiClient::new(&config, session.clone(), navigator.clone())?);
            let flow = AuthCompletion::new(session.clone(), api, navigator.clone());
            let outcome = flow.complete_from_url(&url).await;
            json!({
                "stage": outcome.stage(),
                "destination": outcome.destination(),
                "session": session.snapshot(),
            })
        }
        Command::Check { path, allow } => {
            let allowed = if allow.is_empty() {
                RoleId::ALL
                    .into_iter()
                    .filter(|r| !r.is_guest() && can_access_path(*r, &path))
                    .collect()
            } else {
                allow
            };
            let gate = RoleGate::new(allowed).with_denied_route(config.denied_route.clone());
            json!({ "decision": check_route(&session.snapshot(), &path, &gate) })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
