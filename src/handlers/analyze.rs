use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{
        HeaderMap,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{AnalyzeError, Result};
use crate::export::{ExportRow, to_csv};
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{AnalyzeRequest, AnalyzeResponse, ProviderMode, RateLimitInfo};
use crate::rate_limit::RateDecision;
use crate::seed::Target;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;
const FALLBACK_CLIENT: &str = "local";

// caller identity for the governor: proxy headers first, then the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| FALLBACK_CLIENT.to_string())
}

// hostnames may carry quotes or backslashes, keep the header well-formed
fn export_filename(seed: &str) -> String {
    let safe: String = seed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-keywords.csv", safe)
}

fn wants_csv(query: Option<&str>) -> bool {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).any(|(k, v)| k == "format" && v == "csv"))
        .unwrap_or(false)
}

// GET /api/analyze, liveness only
pub async fn analyze_status_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "route": "/api/analyze" }))
}

// POST /api/analyze
pub async fn analyze_handler(State(state): State<Arc<AppState>>, request: Request) -> Result<Response> {
    REQUEST_TOTAL.inc();

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer);

    // governor runs before the body is even read
    let decision = state
        .governor
        .admit(&format!("analyze:{}", ip), state.policy.limit, state.policy.window);
    if !decision.allowed {
        RATE_LIMITED.inc();
        tracing::warn!(%ip, reset_in_ms = decision.reset_in_ms(), "rate limit exceeded");
        return Err(AnalyzeError::RateLimited {
            reset_in_ms: decision.reset_in_ms(),
        });
    }

    // latency covers every admitted request, failed ones included
    let start_time = Instant::now();
    let outcome = analyze(&state, &ip, decision, request).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    outcome
}

async fn analyze(state: &AppState, ip: &str, decision: RateDecision, request: Request) -> Result<Response> {
    let csv = wants_csv(request.uri().query());

    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| AnalyzeError::InvalidInput("Request body too large or unreadable".to_string()))?;
    let payload: AnalyzeRequest = serde_json::from_slice(&body).map_err(|_| {
        AnalyzeError::InvalidInput("Invalid JSON body. Send {\"url\": \"https://example.com\"}".to_string())
    })?;

    let target = Target::parse(payload.url.as_deref().unwrap_or_default())?;
    let mode = match payload.provider.as_deref() {
        Some(raw) => raw.parse::<ProviderMode>()?,
        None => state.default_provider,
    };

    tracing::info!(ip, domain = %target.domain, seed = %target.seed, provider = %mode, "analyzing");

    let result = state.router.route(&target.seed, mode).await?;

    let rate = RateLimitInfo {
        remaining: decision.remaining,
        reset_in_ms: decision.reset_in_ms(),
    };
    let response = AnalyzeResponse::new(target.domain, target.seed, result, rate);

    if csv {
        let document = to_csv(&ExportRow::from_response(&response))?;
        let disposition = format!("attachment; filename=\"{}\"", export_filename(&response.seed));
        let headers = [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ];
        return Ok((headers, document).into_response());
    }

    Ok(Json(response).into_response())
}
