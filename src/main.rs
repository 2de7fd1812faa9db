use assessment_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/courses/:course_id/completion-quiz",
            get(routes::assessment::get_completion_quiz),
        )
        .route(
            "/api/quizzes/:quiz_id/attempts",
            post(routes::assessment::start_attempt),
        )
        .route(
            "/api/attempts/:attempt_id/submit",
            post(routes::assessment::submit_attempt),
        )
        .route(
            "/api/attempts/:attempt_id/abandon",
            post(routes::assessment::abandon_attempt),
        )
        .route(
            "/api/certificates/:certificate_id",
            get(routes::certificates::verify_certificate),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
