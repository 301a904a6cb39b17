pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod ical;
pub mod images;
pub mod models;
pub mod openapi;
pub mod preferences;
pub mod session;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use handlers::{
    clear_filters, confirm_booking, dismiss_booking, get_booking, get_class, get_dashboard,
    get_filter_options, get_ical, get_preferences, healthz_live, healthz_ready, list_classes,
    remove_filter, root, select_class, set_dark_mode, set_query, toggle_dark_mode,
    toggle_filter,
};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::CatalogLoader;
use crate::dashboard::MemberProfile;
use crate::ical::ICalExporter;
use crate::images::AssetImageResolver;
use crate::openapi::ApiDoc;
use crate::preferences::{DisplayPreferences, FilePreferenceStore, Preferences};
use crate::session::StudioSession;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub session: StudioSession,
    pub preferences: Arc<Preferences>,
    pub profile: Arc<MemberProfile>,
    pub exporter: Arc<ICalExporter>,
}

impl AppState {
    /// State with an empty session; the catalog arrives once
    /// [`StudioSession::start_loading`] completes.
    pub fn new(settings: Settings, preferences: Preferences) -> Self {
        let images = Arc::new(AssetImageResolver::new(&settings.assets_base_url));
        Self {
            session: StudioSession::new(settings.confirmation_delay(), images),
            preferences: Arc::new(preferences),
            profile: Arc::new(MemberProfile::demo(settings.member_name.clone())),
            exporter: Arc::new(ICalExporter::new(settings.studio_name.clone())),
            settings,
        }
    }
}

fn load_preferences(settings: &Settings) -> Preferences {
    let store = Arc::new(FilePreferenceStore::new(&settings.preferences_path));
    Preferences::load(store.clone()).unwrap_or_else(|err| {
        warn!(
            path = %store.path().display(),
            error = %err,
            "failed to read preferences, using defaults"
        );
        Preferences::with_value(store, DisplayPreferences::default())
    })
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let preferences = load_preferences(&settings);
    let state = AppState::new(settings.clone(), preferences);
    state
        .session
        .start_loading(CatalogLoader::new(settings.load_delay()))
        .await;

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Studio Booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.session.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/dashboard", get(get_dashboard))
        .route("/classes", get(list_classes))
        .route("/classes.ical", get(get_ical))
        .route("/classes/options", get(get_filter_options))
        .route("/classes/query", put(set_query))
        .route("/classes/filters", delete(clear_filters))
        .route("/classes/filters/toggle", post(toggle_filter))
        .route("/classes/filters/{tag}", delete(remove_filter))
        .route("/classes/{id}", get(get_class))
        .route("/booking", get(get_booking))
        .route("/booking/select", post(select_class))
        .route("/booking/dismiss", post(dismiss_booking))
        .route("/booking/confirm", post(confirm_booking))
        .route("/preferences", get(get_preferences))
        .route("/preferences/dark-mode", put(set_dark_mode))
        .route("/preferences/dark-mode/toggle", post(toggle_dark_mode))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer).layer(CorsLayer::permissive())
}
