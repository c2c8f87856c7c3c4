use clap::Parser;
use claseando::cli::{Args, build_config, init_logging, load_jwt_secret, open_database};
use claseando::run_server;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Missing .env is fine; the process environment and CLI flags still apply
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let config = build_config(db, jwt_secret, args.mode);

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, mode = ?args.mode, "Listening"),
        Err(_) => info!(address = %addr, mode = ?args.mode, "Listening"),
    }

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
