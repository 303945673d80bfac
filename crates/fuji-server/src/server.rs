//! HTTP server implementation using axum.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use fuji_oracle::{AttestOverride, Oracle, OracleAttestation, OracleInfo};
use fuji_telemetry::Metrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    oracle: Arc<Oracle>,
}

impl AppState {
    pub fn new(oracle: Arc<Oracle>) -> Self {
        Self { oracle }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/oracle", get(oracle_info))
        .route("/oracle/{ticker}", get(attest))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

async fn ping() -> Json<MessageBody> {
    Json(MessageBody {
        message: "pong".to_string(),
    })
}

async fn oracle_info(State(state): State<AppState>) -> Json<OracleInfo> {
    Json(state.oracle.info())
}

/// Optional development override. Only used when both values are present
/// and non-empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttestQuery {
    timestamp: Option<String>,
    last_price: Option<String>,
}

impl AttestQuery {
    fn into_override(self) -> Result<Option<AttestOverride>, String> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(timestamp), Some(price)) = (non_empty(self.timestamp), non_empty(self.last_price))
        else {
            return Ok(None);
        };
        let timestamp = Decimal::from_str(timestamp.trim())
            .map_err(|e| format!("invalid timestamp {timestamp:?}: {e}"))?;
        let price = Decimal::from_str(price.trim())
            .map_err(|e| format!("invalid lastPrice {price:?}: {e}"))?;
        Ok(Some(AttestOverride { timestamp, price }))
    }
}

async fn attest(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AttestQuery>,
) -> Response {
    let override_values = match query.into_override() {
        Ok(values) => values,
        Err(reason) => return message_response(StatusCode::BAD_REQUEST, reason),
    };
    let mode = if override_values.is_some() && state.oracle.override_enabled() {
        "override"
    } else {
        "live"
    };

    let started = Instant::now();
    let result = state.oracle.attest(&ticker, override_values).await;
    Metrics::feeds_quarantined(state.oracle.aggregator().quarantined_feeds().len());

    match result {
        Ok(Some(attestation)) => {
            if mode == "live" {
                Metrics::aggregation_duration(started.elapsed().as_secs_f64() * 1000.0);
            }
            Metrics::attestation(&ticker, mode);
            Json(OracleAttestation::from(&attestation)).into_response()
        }
        Ok(None) => message_response(
            StatusCode::NOT_FOUND,
            format!("no attestation available for ticker {ticker}"),
        ),
        Err(e) => {
            warn!(%ticker, error = %e, "Attestation failed");
            Metrics::attestation_error(e.kind());
            message_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn metrics() -> Response {
    match Metrics::gather() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => message_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Run the oracle HTTP server until `shutdown` resolves.
pub async fn run_server(
    oracle: Arc<Oracle>,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> ServerResult<()> {
    let app = create_router(AppState::new(oracle));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "Starting oracle server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Oracle server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use fuji_attest::{AttestationBuilder, Secp256k1Signer};
    use fuji_core::ManualClock;
    use fuji_feed::{Aggregator, MockFeed};
    use fuji_oracle::OracleConfig;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    const TEST_PRIVATE_KEY: &str =
        "97abcd30d2cac1c96271711e567ee13ec27ce4360def5f58caea31eb7c926062";

    fn router_with(feed: MockFeed, config: OracleConfig) -> Router {
        let aggregator = Arc::new(
            Aggregator::builder()
                .feed(Arc::new(feed))
                .clock(Arc::new(ManualClock::new(0)))
                .build(),
        );
        let signer = Secp256k1Signer::from_bytes(&hex::decode(TEST_PRIVATE_KEY).unwrap()).unwrap();
        let oracle = Oracle::new(config, aggregator, AttestationBuilder::new(Arc::new(signer)))
            .unwrap()
            .with_clock(Arc::new(ManualClock::new(1_656_508_635_000)));
        create_router(AppState::new(Arc::new(oracle)))
    }

    fn router() -> Router {
        router_with(MockFeed::price("static", dec!(20095.56)), OracleConfig::default())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_ping() {
        let (status, body) = get(router(), "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"message": "pong"}));
    }

    #[tokio::test]
    async fn test_oracle_info() {
        let (status, body) = get(router(), "/oracle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["publicKey"],
            "03f03225c0efa4da141b7ed4b1d2368732719c9430bd329ed8a757fa0022833d3f"
        );
        assert_eq!(body["availableTickers"], serde_json::json!(["BTCUSD"]));
    }

    #[tokio::test]
    async fn test_attest_live() {
        let (status, body) = get(router(), "/oracle/BTCUSD").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timestamp"], "1656508635000");
        assert_eq!(body["lastPrice"], "20095");
        assert_eq!(body["attestation"]["signature"].as_str().unwrap().len(), 128);
        assert_eq!(body["attestation"]["messageHash"].as_str().unwrap().len(), 64);
        assert!(body["attestation"]["message"]
            .as_str()
            .unwrap()
            .ends_with("555344"));
    }

    #[tokio::test]
    async fn test_attest_unknown_ticker() {
        let (status, body) = get(router(), "/oracle/DOGEUSD").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "no attestation available for ticker DOGEUSD");
    }

    #[tokio::test]
    async fn test_attest_override() {
        let config = OracleConfig {
            development_override: true,
            ..OracleConfig::default()
        };
        let app = router_with(MockFeed::failing("down"), config);

        let (status, body) = get(app, "/oracle/BTCUSD?timestamp=1656508635&lastPrice=20095").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["attestation"]["message"],
            "db50bc62000000007f4e000000000000555344"
        );
        assert_eq!(
            body["attestation"]["signature"],
            "ebb5be1f747d8a257452124ef8b5802070337ab4d377e43aee47c8c29777bf74991304bf36ef0218fb2755167d1ff334c18c395e038d382d0d477049e8501c6d"
        );
    }

    #[tokio::test]
    async fn test_attest_partial_override_uses_live_price() {
        let config = OracleConfig {
            development_override: true,
            ..OracleConfig::default()
        };
        let app = router_with(MockFeed::price("static", dec!(47169.9)), config);

        let (status, body) = get(app, "/oracle/BTCUSD?timestamp=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lastPrice"], "47169");
        assert_eq!(body["timestamp"], "1656508635000");
    }

    #[tokio::test]
    async fn test_attest_empty_override_uses_live_price() {
        let config = OracleConfig {
            development_override: true,
            ..OracleConfig::default()
        };
        let app = router_with(MockFeed::price("static", dec!(20095.56)), config);

        let (status, body) = get(app, "/oracle/BTCUSD?timestamp=&lastPrice=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lastPrice"], "20095");
        assert_eq!(body["timestamp"], "1656508635000");
    }

    #[tokio::test]
    async fn test_attest_bad_override_is_bad_request() {
        let (status, body) = get(router(), "/oracle/BTCUSD?timestamp=abc&lastPrice=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("timestamp"));
    }

    #[tokio::test]
    async fn test_attest_fractional_override_is_internal_error() {
        let config = OracleConfig {
            development_override: true,
            ..OracleConfig::default()
        };
        let app = router_with(MockFeed::price("static", dec!(1)), config);

        let (status, body) =
            get(app, "/oracle/BTCUSD?timestamp=1656508635&lastPrice=20095.5").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().contains("price"));
    }

    #[tokio::test]
    async fn test_attest_all_feeds_down() {
        let app = router_with(MockFeed::failing("down"), OracleConfig::default());
        let (status, body) = get(app, "/oracle/BTCUSD").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("No price source available for ticker BTCUSD"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header(header::ORIGIN, "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[test]
    fn test_query_requires_both_values() {
        let query = AttestQuery {
            timestamp: Some("1".to_string()),
            last_price: None,
        };
        assert_eq!(query.into_override().unwrap(), None);

        let query = AttestQuery {
            timestamp: Some(" ".to_string()),
            last_price: Some("20095".to_string()),
        };
        assert_eq!(query.into_override().unwrap(), None);

        let query = AttestQuery {
            timestamp: Some(" 1656508635 ".to_string()),
            last_price: Some("20095".to_string()),
        };
        assert_eq!(
            query.into_override().unwrap(),
            Some(AttestOverride {
                timestamp: dec!(1656508635),
                price: dec!(20095),
            })
        );
    }
}
