use actix_web::{web, HttpResponse};

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database = state.db.health_check().await;
    let body = HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
    };

    if database {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
