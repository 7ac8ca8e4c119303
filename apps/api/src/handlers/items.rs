//! Item catalog. Reads are public; writes need `manage-items`.

use actix_web::{web, HttpResponse};
use pharmos_core::{ItemPatch, NewItem};
use tracing::{info, instrument};

use crate::dto::{DeletedResponse, ItemView, ListItemsQuery};
use crate::error::ApiResult;
use crate::gate::{can, Allowed};
use crate::state::AppState;

#[instrument(name = "handler::list_items", skip_all, fields(sellable = query.sellable))]
pub async fn list_items(
    state: web::Data<AppState>,
    query: web::Query<ListItemsQuery>,
) -> ApiResult<HttpResponse> {
    let today = state.today();
    let policy = state.status_policy;

    let items = if query.sellable {
        state.db.items().list_sellable(today, &policy).await?
    } else {
        state.db.items().list().await?
    };

    let views: Vec<ItemView> = items
        .into_iter()
        .map(|item| ItemView::new(item, today, &policy))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[instrument(name = "handler::get_item", skip_all, fields(id = %path.as_str()))]
pub async fn get_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item = state.db.items().get(&path).await?;
    Ok(HttpResponse::Ok().json(ItemView::new(item, state.today(), &state.status_policy)))
}

#[instrument(name = "handler::create_item", skip_all, fields(name = %body.name))]
pub async fn create_item(
    caller: Allowed<can::ManageItems>,
    state: web::Data<AppState>,
    body: web::Json<NewItem>,
) -> ApiResult<HttpResponse> {
    let item = state.db.items().create(&body).await?;
    info!(id = %item.id, by = %caller.subject().id, "Item created");
    Ok(HttpResponse::Ok().json(ItemView::new(item, state.today(), &state.status_policy)))
}

#[instrument(name = "handler::update_item", skip_all, fields(id = %path.as_str()))]
pub async fn update_item(
    _caller: Allowed<can::ManageItems>,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ItemPatch>,
) -> ApiResult<HttpResponse> {
    let item = state.db.items().update(&path, &body).await?;
    Ok(HttpResponse::Ok().json(ItemView::new(item, state.today(), &state.status_policy)))
}

#[instrument(name = "handler::delete_item", skip_all, fields(id = %path.as_str()))]
pub async fn delete_item(
    caller: Allowed<can::ManageItems>,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.db.items().delete(&id).await?;
    info!(%id, by = %caller.subject().id, "Item deleted");
    Ok(HttpResponse::Ok().json(DeletedResponse { id }))
}
