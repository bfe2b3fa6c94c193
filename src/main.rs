use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use seo_gateway::{AppState, Args, app, logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();
    logger::init_logger(args.log_json);

    let state = Arc::new(AppState::from_args(&args));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Gateway running on http://localhost:{}", args.port);
    tracing::info!(
        "Rate limit: {} requests per {} ms",
        args.rate_limit,
        args.rate_window_ms
    );
    tracing::info!(provider = %args.default_provider, "Default provider");
    if args.dataforseo_login.is_none() || args.dataforseo_password.is_none() {
        tracing::info!("DataForSEO credentials not set, dataforseo requests will fail");
    }

    // peer addresses feed the rate limit key when no proxy header is present
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
