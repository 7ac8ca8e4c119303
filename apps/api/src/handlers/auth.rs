//! Login and first-run bootstrap.

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};

use crate::dto::{BootstrapRequest, LoginRequest, LoginResponse};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::AppState;

/// Creates the superadmin account. Only succeeds while none exists.
#[instrument(name = "handler::bootstrap", skip_all, fields(email = %body.email))]
pub async fn bootstrap(
    state: web::Data<AppState>,
    body: web::Json<BootstrapRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let user = state
        .db
        .users()
        .bootstrap_superadmin(&body.name, &body.email, &body.password)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Exchanges email and password for a bearer token.
#[instrument(name = "handler::login", skip_all, fields(email = %body.email))]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .db
        .users()
        .verify_credentials(&body.email, &body.password)
        .await?;

    let Some(user) = user else {
        warn!("Login rejected");
        return Err(ApiError::new(
            ErrorCode::Unauthenticated,
            "Invalid email or password",
        ));
    };

    let (token, expires_at) = state.jwt.issue(&user)?;
    info!(user = %user.id, role = %user.role, "Login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user,
        expires_at,
    }))
}
