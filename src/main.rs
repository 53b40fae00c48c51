use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use read::LedgerFormat;
use service::{AccountService, LedgerSource};

mod compute;
mod data;
mod read;
mod service;

/// Shared application state
#[derive(Clone)]
struct AppState {
    account: Arc<AccountService>,
}

/// Body of `GET /api/account-history`.
#[derive(Serialize)]
struct AccountHistoryResponse {
    balance: Decimal,
}

/// GET /api/health - liveness probe
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/account-history - balance from the replayed ledger
async fn account_history(State(state): State<AppState>) -> impl IntoResponse {
    match state.account.account_summary().await {
        Ok(summary) => Json(AccountHistoryResponse {
            balance: summary.balance,
        })
        .into_response(),
        Err(e) => {
            error!("account history unavailable: {e:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port: u16 = env_or("PORT", "3000")
        .parse()
        .context("PORT must be a valid port number")?;
    let ledger_file = PathBuf::from(env_or("LEDGER_FILE", "data/sample-ledger.csv"));

    let account = Arc::new(AccountService::new(LedgerSource {
        path: ledger_file,
        format: LedgerFormat::default(),
    }));

    // Warm the cache so the first request doesn't pay for the parse.
    let warm = Arc::clone(&account);
    tokio::spawn(async move {
        match warm.account_summary().await {
            Ok(summary) => {
                let through = summary.history.last().map(|entry| entry.transaction.date);
                info!(
                    rows = summary.history.len(),
                    balance = %summary.balance,
                    principal_paid = %summary.total_principal,
                    interest_paid = %summary.total_interest,
                    fees_paid = %summary.total_fees,
                    through = ?through,
                    "account history loaded"
                );
            }
            Err(e) => error!("account history failed to load: {e:#}"),
        }
    });

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/account-history", get(account_history))
        .with_state(AppState { account });

    let app = Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new("public"))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
