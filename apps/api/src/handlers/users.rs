//! User management. Everything here except `me` needs `manage-users`.

use actix_web::{web, HttpResponse};
use pharmos_core::{NewUser, UserPatch};
use tracing::{info, instrument};

use crate::dto::DeletedResponse;
use crate::error::ApiResult;
use crate::gate::{can, Allowed, Caller};
use crate::state::AppState;

/// The account behind the presented token.
#[instrument(name = "handler::me", skip_all, fields(user = %caller.subject().id))]
pub async fn me(caller: Caller, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let user = state.db.users().get(&caller.subject().id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::list_users", skip_all)]
pub async fn list_users(
    _caller: Allowed<can::ManageUsers>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let users = state.db.users().list().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[instrument(name = "handler::create_user", skip_all, fields(role = %body.role))]
pub async fn create_user(
    caller: Allowed<can::ManageUsers>,
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> ApiResult<HttpResponse> {
    let user = state.db.users().create(&body).await?;
    info!(id = %user.id, by = %caller.subject().id, "User created");
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::update_user", skip_all, fields(id = %path.as_str()))]
pub async fn update_user(
    _caller: Allowed<can::ManageUsers>,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UserPatch>,
) -> ApiResult<HttpResponse> {
    let user = state.db.users().update(&path, &body).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::delete_user", skip_all, fields(id = %path.as_str()))]
pub async fn delete_user(
    caller: Allowed<can::ManageUsers>,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.db.users().delete(&id).await?;
    info!(%id, by = %caller.subject().id, "User deleted");
    Ok(HttpResponse::Ok().json(DeletedResponse { id }))
}
