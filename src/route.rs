use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    error::AppError,
    export::{self, ExportFormat},
    model::{
        api_request::{DashboardQuery, LoginForm, SourceQuery},
        api_response::{ChargePointsResponse, SessionInfo, charge_point_options},
    },
    report,
    session::{SessionContext, expired_session_cookie, session_cookie},
    source::{self, DataSource},
    state::AppState,
};

pub fn app(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/session", get(get_session))
        .route("/api/charge_points", get(get_charge_points))
        .route("/api/dashboard", get(get_dashboard))
        .route("/export/{format}", get(get_export))
        .fallback(handler_404)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "")
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let context = state
        .sessions
        .login(&state.config.users, &form.account, &form.password)?;
    Ok((
        [(header::SET_COOKIE, session_cookie(&context.token))],
        Json(SessionInfo {
            account: context.account,
            since: context.created_at,
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, session: SessionContext) -> impl IntoResponse {
    state.sessions.logout(&session.token);
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
}

pub async fn get_session(session: SessionContext) -> Json<SessionInfo> {
    Json(SessionInfo {
        account: session.account,
        since: session.created_at,
    })
}

pub async fn get_charge_points(
    State(state): State<AppState>,
    _session: SessionContext,
    Query(SourceQuery {
        source: data_source,
    }): Query<SourceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = source::fetch(data_source, &state).await?;
    let mut warnings = outcome.warnings;

    let remote_groups = match data_source {
        DataSource::Local => None,
        DataSource::Remote => {
            let (listing, warning) = state.remote.fetch_charge_point_groups().await;
            warnings.extend(warning);
            Some(listing)
        }
    };

    Ok(Json(ChargePointsResponse {
        options: charge_point_options(&outcome.table),
        remote_groups,
        warnings,
    }))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    info!(account = %session.account, query = ?query, "Dashboard requested");
    query.validate()?;
    let outcome = source::fetch(query.source, &state).await?;
    Ok(Json(report::build(outcome, &query)))
}

pub async fn get_export(
    State(state): State<AppState>,
    session: SessionContext,
    Path(format): Path<ExportFormat>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;
    let outcome = source::fetch(query.source, &state).await?;
    let filtered = report::filtered_table(&outcome.table, &query);
    let bytes = export::serialize(&filtered, format)?;
    info!(
        account = %session.account,
        format = ?format,
        rows = filtered.len(),
        bytes = bytes.len(),
        "Export generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    ))
}
