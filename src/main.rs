use watchlink::routes;
use watchlink::services::control::SimulatorControl;
use watchlink::services::simulator::DeviceConfig;
use watchlink::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8765".into())
        .parse()
        .expect("invalid PORT");

    let state = AppState::new();
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    // Optionally run the device simulator in-process against our own relay,
    // the same way the host process would start it on demand.
    let autostart = std::env::var("SIMULATOR_AUTOSTART")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let mut control = SimulatorControl::new(DeviceConfig {
        server_url: format!("ws://localhost:{port}"),
        ..DeviceConfig::default()
    });
    if autostart {
        let result = control.start();
        if result.success {
            tracing::info!("ai simulator autostarted");
        } else {
            tracing::warn!(error = ?result.error, "ai simulator autostart failed");
        }
    }

    tracing::info!(%port, "watchlink relay listening");
    axum::serve(listener, app).await.expect("server failed");
}
