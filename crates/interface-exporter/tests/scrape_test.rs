//! End-to-end scrapes over a real listener

use axum::{Router, routing::get};
use interface_exporter::{
    HEALTH_METRIC_NAME, HealthCollector, MetricsRegistry, MetricsServer, TargetRegistry,
};
use interface_probe::{ProbeConfig, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

async fn spawn_health_endpoint() -> String {
    let app = Router::new().route("/health", get(|| async { "ok" }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/health", addr)
}

fn gauge_value(body: &str, name: &str) -> Option<f64> {
    body.lines()
        .filter(|l| l.starts_with(HEALTH_METRIC_NAME))
        .find(|l| l.contains(&format!("name=\"{}\"", name)))
        .and_then(|l| l.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
}

#[tokio::test]
async fn test_scrape_reports_each_target() {
    let api_url = spawn_health_endpoint().await;
    let db = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().to_string()
    };

    let registry = TargetRegistry::new(vec![
        Target::new("api", api_url, "http", None),
        Target::new("db", db.local_addr().unwrap().to_string(), "tcp", None),
        Target::new("cache", dead, "tcp", None),
    ]);
    let metrics = Arc::new(MetricsRegistry::new());
    let collector =
        HealthCollector::new(&registry, &ProbeConfig::default(), Some(metrics.clone())).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = MetricsServer::new(collector, metrics, addr.to_string(), "/metrics".to_string());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async {
        stop_rx.await.ok();
    }));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    for scrape in 1..=2 {
        let response = client
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = response.text().await.unwrap();

        assert_eq!(gauge_value(&body, "api"), Some(1.0));
        assert_eq!(gauge_value(&body, "db"), Some(1.0));
        assert_eq!(gauge_value(&body, "cache"), Some(0.0));
        assert!(body.contains(&format!("interface_exporter_scrapes_total {}", scrape)));
        assert!(body.contains("interface_exporter_targets 3"));
    }

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
