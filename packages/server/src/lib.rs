#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the city monitor.
//!
//! Exposes the place registry, per-viewer monitoring sessions backed by the
//! realtime core, air quality forecasts, and the analytics views as a JSON
//! REST API. Sessions live in memory, keyed by UUID, and are dropped when
//! the viewer deletes them, when they sit idle past `SESSION_TTL_SECS`, or
//! when the server stops.

mod handlers;
pub mod interactive;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, ResponseError, middleware, web};
use city_monitor_air_quality::OpenWeatherProvider;
use city_monitor_analytics::synthetic;
use city_monitor_analytics_models::CitySnapshot;
use city_monitor_geography::{GeographyError, Registry};
use city_monitor_geography_models::Coverage;
use city_monitor_realtime::{Generator, MonitorConfig, MonitorError, Session};
use city_monitor_server_models::ApiError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No session with this ID exists.
    #[error("Unknown session: {0}")]
    UnknownSession(Uuid),
    /// The realtime core rejected the request.
    #[error(transparent)]
    Monitor(#[from] MonitorError),
    /// The registry rejected the request.
    #[error(transparent)]
    Geography(#[from] GeographyError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownSession(_) | Self::Geography(GeographyError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::Monitor(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Monitor(_) | Self::Geography(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError {
            error: self.to_string(),
        })
    }
}

/// A session plus the last time a request touched it.
struct SessionEntry {
    session: Session,
    last_access: Instant,
}

impl SessionEntry {
    /// Marks the session as used now and returns it.
    fn touch(&mut self) -> &mut Session {
        self.last_access = Instant::now();
        &mut self.session
    }
}

/// Shared application state.
pub struct AppState {
    /// Registry of monitored places.
    pub registry: Arc<Registry>,
    /// Observation generator shared by every session.
    pub generator: Arc<Generator>,
    /// Window retention, refresh, and idle session settings.
    pub config: MonitorConfig,
    /// Synthetic traffic and pollution profiles of every place, drawn once
    /// at startup so the analytics views agree with each other.
    profiles: Vec<CitySnapshot>,
    sessions: Mutex<BTreeMap<Uuid, SessionEntry>>,
}

impl AppState {
    /// Creates state for `registry`, drawing the analytics profiles.
    #[must_use]
    pub fn new(registry: Registry, generator: Generator, config: MonitorConfig) -> Self {
        let profiles = synthetic::city_snapshots(
            &registry.at_coverage(Coverage::CitiesAndAreas),
            &mut rand::rng(),
        );

        Self {
            registry: Arc::new(registry),
            generator: Arc::new(generator),
            config,
            profiles,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates state for the built-in registry, the OpenWeather provider,
    /// and monitor settings from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let generator = Generator::new(Arc::new(OpenWeatherProvider::from_env()));
        Self::new(Registry::builtin(), generator, MonitorConfig::from_env())
    }

    /// Locks the session map. A poisoned lock is recovered since sessions
    /// hold no cross-entry invariants.
    fn sessions(&self) -> MutexGuard<'_, BTreeMap<Uuid, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops sessions idle for longer than the configured TTL as of `now`
    /// and returns how many were dropped.
    fn evict_idle(&self, now: Instant) -> usize {
        let ttl = self.config.session_ttl;
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.last_access) <= ttl;
            if !keep {
                log::info!("Evicted idle session {id}");
            }
            keep
        });
        before - sessions.len()
    }

    /// Opens a new session and returns its ID.
    fn open_session(&self, coverage: Coverage) -> (Uuid, String) {
        let mut session = Session::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.generator),
            &self.config,
        );
        session.set_detail_level(coverage);
        let selected = session.selected_place().to_string();

        let now = Instant::now();
        let evicted = self.evict_idle(now);
        if evicted > 0 {
            log::debug!("Evicted {evicted} idle session(s)");
        }

        let id = Uuid::new_v4();
        self.sessions().insert(
            id,
            SessionEntry {
                session,
                last_access: now,
            },
        );
        log::info!("Opened session {id}");
        (id, selected)
    }

    /// Analytics profiles of the places visible under `coverage`.
    fn profiles(&self, coverage: Coverage) -> Vec<CitySnapshot> {
        self.profiles
            .iter()
            .filter(|profile| {
                self.registry
                    .lookup(&profile.place_name)
                    .is_ok_and(|place| coverage.includes(place.detail))
            })
            .cloned()
            .collect()
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/places", web::get().to(handlers::places))
            .route("/sessions", web::post().to(handlers::create_session))
            .route("/sessions/{id}", web::get().to(handlers::get_session))
            .route("/sessions/{id}", web::delete().to(handlers::delete_session))
            .route("/sessions/{id}/refresh", web::post().to(handlers::refresh))
            .route("/sessions/{id}/snapshot", web::get().to(handlers::snapshot))
            .route("/forecast", web::get().to(handlers::forecast))
            .service(
                web::scope("/analytics")
                    .route("/overview", web::get().to(handlers::analytics_overview))
                    .route("/snapshot", web::get().to(handlers::analytics_snapshot))
                    .route("/trends", web::get().to(handlers::analytics_trends))
                    .route("/matrix", web::get().to(handlers::analytics_matrix))
                    .route("/clusters", web::get().to(handlers::analytics_clusters))
                    .route(
                        "/distribution",
                        web::get().to(handlers::analytics_distribution),
                    )
                    .route(
                        "/correlation",
                        web::get().to(handlers::analytics_correlation),
                    )
                    .route("/network", web::get().to(handlers::analytics_network))
                    .route("/incidents", web::get().to(handlers::analytics_incidents)),
            ),
    );
}

/// Starts the city monitor API server.
///
/// Builds the application state from the environment and starts the
/// Actix-Web HTTP server on `BIND_ADDR:PORT`. This is a regular async
/// function; the caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_env());

    log::info!(
        "Monitoring {} places via {}",
        state.registry.len(),
        state.generator.provider_id()
    );

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
