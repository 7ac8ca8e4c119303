//! Sale creation (POS checkout) and billing history.

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::dto::{CreateSaleRequest, SaleResponse};
use crate::error::ApiResult;
use crate::gate::{can, Allowed};
use crate::state::AppState;

/// Records a sale and decrements stock, all or nothing.
///
/// Prices are resolved server-side from the catalog; the request only names
/// items and quantities.
#[instrument(
    name = "handler::create_sale",
    skip_all,
    fields(user = %caller.subject().id, lines = body.lines.len())
)]
pub async fn create_sale(
    caller: Allowed<can::CreateSale>,
    state: web::Data<AppState>,
    body: web::Json<CreateSaleRequest>,
) -> ApiResult<HttpResponse> {
    let sale = state
        .db
        .sales()
        .create_sale(&body.lines, &caller.subject().id)
        .await?;
    Ok(HttpResponse::Ok().json(SaleResponse { sale }))
}

/// All sales, newest first.
#[instrument(name = "handler::list_sales", skip_all)]
pub async fn list_sales(
    _caller: Allowed<can::ReadSale>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let sales = state.db.sales().list().await?;
    Ok(HttpResponse::Ok().json(sales))
}

#[instrument(name = "handler::get_sale", skip_all, fields(id = %path.as_str()))]
pub async fn get_sale(
    _caller: Allowed<can::ReadSale>,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let sale = state.db.sales().get(&path).await?;
    Ok(HttpResponse::Ok().json(sale))
}
