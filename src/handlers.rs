use crate::gateway::{Gateway, GatewayError};
use crate::models::{Envelope, Health, NewRegistration, Registration};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the API router. Every route lives under `/api`.
pub fn router(gateway: Gateway) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route(
            "/registrations",
            get(list_registrations).post(create_registration),
        )
        .route("/registrations/:email", get(get_registration));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

pub async fn health(State(gateway): State<Gateway>) -> Result<Json<Health>, GatewayError> {
    gateway.health().await?;
    Ok(Json(Health {
        status: "ok",
        message: "API is running",
    }))
}

pub async fn create_registration(
    State(gateway): State<Gateway>,
    body: Result<Json<NewRegistration>, JsonRejection>,
) -> Response {
    let Json(registration) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("rejected registration body: {}", rejection);
            return failure(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match gateway.create_registration(registration).await {
        Ok(created) => (StatusCode::CREATED, Json(Envelope::ok(created))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_registrations(
    State(gateway): State<Gateway>,
) -> Result<Json<Envelope<Vec<Registration>>>, GatewayError> {
    Ok(Json(Envelope::ok(gateway.get_all_registrations().await?)))
}

pub async fn get_registration(
    State(gateway): State<Gateway>,
    Path(email): Path<String>,
) -> Result<Json<Envelope<Registration>>, GatewayError> {
    Ok(Json(Envelope::ok(
        gateway.get_registration_by_email(&email).await?,
    )))
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::<()>::failed(message))).into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::Invalid(_) | GatewayError::DuplicateEmail => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::MissingTable
            | GatewayError::PermissionDenied
            | GatewayError::CreateFailed
            | GatewayError::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        failure(status, self.to_string())
    }
}
