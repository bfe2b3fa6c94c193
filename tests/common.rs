use std::net::SocketAddr;
use std::sync::Arc;

use seo_gateway::{AppState, Args, ProviderMode, app};

// every upstream points at the same mock server
pub fn args_for(upstream: &str) -> Args {
    Args {
        port: 0,
        rate_limit: 10,
        rate_window_ms: 60_000,
        default_provider: ProviderMode::Trends,
        dataforseo_login: None,
        dataforseo_password: None,
        trends_url: upstream.to_string(),
        suggest_url: upstream.to_string(),
        dataforseo_url: upstream.to_string(),
        log_json: false,
    }
}

// serves a fresh app (own governor) on an ephemeral port
pub async fn spawn_app(args: Args) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::from_args(&args));

    tokio::spawn(async move {
        axum::serve(
            listener,
            app(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
