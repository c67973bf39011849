use axum::{
    Router, debug_handler,
    response::Redirect,
    routing::{get, post},
};
use lettre::transport::stub::AsyncStubTransport;
use mentorlink::{
    AppResult, AppState, auth,
    config::Config,
    dashboard, feedback, interests,
    notify::{self, Notifier},
    rooms::{self, ChatRelay},
    session::USER_EMAIL,
    store::Store,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, cookie::SameSite};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let store = Store::open(&config.data_dir)?;

    let notifier = if config.mail_enabled() {
        Notifier::spawn(notify::smtp_transport(&config)?, &config)
    } else {
        info!("EMAIL_USER not set; match notifications will only be logged");
        Notifier::spawn(AsyncStubTransport::new_ok(), &config)
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let app_state = AppState {
        config: config.clone(),
        store,
        relay: ChatRelay::new(),
        notifier,
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/select-interest", post(interests::select_interest))
        .route("/edit-interests", post(interests::edit_interests))
        .route("/feedback", get(feedback::feedback_page))
        .route("/submit-feedback", post(feedback::submit_feedback))
        .merge(auth::router())
        .nest("/chat", rooms::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("listening on port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

#[debug_handler]
async fn index(session: Session) -> AppResult<Redirect> {
    Ok(match session.get::<String>(USER_EMAIL).await? {
        Some(email) => Redirect::to(&format!("/dashboard?email={email}")),
        None => Redirect::to("/login"),
    })
}
