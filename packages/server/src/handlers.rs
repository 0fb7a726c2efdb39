//! HTTP handler functions for the city monitor API.

use actix_web::{HttpResponse, web};
use chrono::{Local, Utc};
use city_monitor_analytics::overview::DEFAULT_CONCURRENCY;
use city_monitor_analytics::{aqi_overview, synthetic};
use city_monitor_geography::DEFAULT_PLACE;
use city_monitor_server_models::{
    ApiForecast, ApiHealth, ApiSession, ApiSnapshot, CoverageParams, ForecastParams, PlaceParams,
    TrendParams,
};
use uuid::Uuid;

use crate::{AppState, ServerError};

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.generator.provider_id().to_string(),
    })
}

/// `GET /api/places`
///
/// Lists registered places, cities only unless `detail=all`.
pub async fn places(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.at_coverage(params.coverage()))
}

/// `POST /api/sessions`
///
/// Opens a monitoring session with an empty window.
pub async fn create_session(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let coverage = params.coverage();
    let (id, selected_place) = state.open_session(coverage);

    HttpResponse::Created().json(ApiSession {
        id,
        selected_place,
        coverage,
    })
}

/// `GET /api/sessions/{id}`
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or(ServerError::UnknownSession(id))?
        .touch();

    let body = ApiSession {
        id,
        selected_place: session.selected_place().to_string(),
        coverage: session.coverage(),
    };
    drop(sessions);

    Ok(HttpResponse::Ok().json(body))
}

/// `DELETE /api/sessions/{id}`
pub async fn delete_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    state
        .sessions()
        .remove(&id)
        .ok_or(ServerError::UnknownSession(id))?;

    log::info!("Closed session {id}");
    Ok(HttpResponse::NoContent().finish())
}

/// `POST /api/sessions/{id}/refresh`
///
/// Generates an observation for `place` (or the selected place), records it
/// in the session's window, and selects the place. The session lock is not
/// held while the air quality provider is queried.
pub async fn refresh(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<PlaceParams>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();

    let place = {
        let mut sessions = state.sessions();
        let session = sessions
            .get_mut(&id)
            .ok_or(ServerError::UnknownSession(id))?
            .touch();
        let name = params
            .place
            .as_deref()
            .unwrap_or_else(|| session.selected_place());
        state.registry.lookup(name)?.clone()
    };

    let observation = state.generator.generate(&place).await;

    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or(ServerError::UnknownSession(id))?
        .touch();
    session.select_place(&place.name)?;
    session.record(observation.clone())?;
    drop(sessions);

    log::debug!(
        "Session {id}: {} AQI {} ({})",
        observation.place_name,
        observation.air_quality_index,
        observation.source
    );

    Ok(HttpResponse::Ok().json(observation))
}

/// `GET /api/sessions/{id}/snapshot`
///
/// Prunes the session's window and returns the entries for `place` (or the
/// selected place), falling back to the most recent entries across all
/// places when it has none.
pub async fn snapshot(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<PlaceParams>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();

    let mut sessions = state.sessions();
    let session = sessions
        .get_mut(&id)
        .ok_or(ServerError::UnknownSession(id))?
        .touch();
    let name = params
        .place
        .clone()
        .unwrap_or_else(|| session.selected_place().to_string());
    let snapshot = session.view(&name, Utc::now())?;
    drop(sessions);

    Ok(HttpResponse::Ok().json(ApiSnapshot::from(snapshot)))
}

/// `GET /api/forecast`
pub async fn forecast(
    state: web::Data<AppState>,
    params: web::Query<ForecastParams>,
) -> Result<HttpResponse, ServerError> {
    let place = state.registry.lookup(&params.place)?;
    let horizon_hours = params.horizon_hours();
    let points = state.generator.forecast(place, horizon_hours).await;

    Ok(HttpResponse::Ok().json(ApiForecast {
        place_name: place.name.clone(),
        horizon_hours,
        available: !points.is_empty(),
        points,
    }))
}

/// `GET /api/analytics/overview`
///
/// Current AQI of every place, worst first.
pub async fn analytics_overview(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let places = state.registry.at_coverage(params.coverage());
    let overview = aqi_overview(&places, state.generator.provider(), DEFAULT_CONCURRENCY).await;
    HttpResponse::Ok().json(overview)
}

/// `GET /api/analytics/snapshot`
pub async fn analytics_snapshot(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.profiles(params.coverage()))
}

/// `GET /api/analytics/trends`
pub async fn analytics_trends(params: web::Query<TrendParams>) -> HttpResponse {
    let report = synthetic::hourly_trend(
        Local::now().fixed_offset(),
        params.days(),
        &mut rand::rng(),
    );
    HttpResponse::Ok().json(report)
}

/// `GET /api/analytics/matrix`
pub async fn analytics_matrix() -> HttpResponse {
    HttpResponse::Ok().json(synthetic::pollution_matrix(&mut rand::rng()))
}

/// `GET /api/analytics/clusters`
pub async fn analytics_clusters(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let profiles = state.profiles(params.coverage());
    HttpResponse::Ok().json(synthetic::sensor_clusters(&profiles, &mut rand::rng()))
}

/// `GET /api/analytics/distribution`
///
/// AQI samples for the worst places plus the default place.
pub async fn analytics_distribution(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let profiles = state.profiles(params.coverage());
    HttpResponse::Ok().json(synthetic::distributions(
        &profiles,
        DEFAULT_PLACE,
        &mut rand::rng(),
    ))
}

/// `GET /api/analytics/correlation`
pub async fn analytics_correlation(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let profiles = state.profiles(params.coverage());
    HttpResponse::Ok().json(synthetic::correlation_report(&profiles))
}

/// `GET /api/analytics/network`
///
/// Weighted corridors between the leading places.
pub async fn analytics_network(
    state: web::Data<AppState>,
    params: web::Query<CoverageParams>,
) -> HttpResponse {
    let profiles = state.profiles(params.coverage());
    HttpResponse::Ok().json(synthetic::route_network(&profiles, &mut rand::rng()))
}

/// `GET /api/analytics/incidents`
pub async fn analytics_incidents() -> HttpResponse {
    HttpResponse::Ok().json(synthetic::incident_frequencies(&mut rand::rng()))
}
