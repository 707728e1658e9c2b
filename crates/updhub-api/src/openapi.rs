//! OpenAPI 3.1 document, generated from the utoipa annotations on the
//! route handlers and served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::{ErrorBody, ErrorDetail};
use crate::routes;
use crate::state::AppState;

/// API documentation root.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "updhub",
        description = "Licensing and update coordination service: module \
                       authorization synchronization and artifact publication."
    ),
    paths(
        routes::updates::update_status,
        routes::sync::synchronize,
        routes::publish::publish_modules,
    ),
    components(schemas(
        routes::updates::UpdateStatusResponse,
        routes::sync::SyncRequest,
        routes::sync::SyncResponse,
        routes::publish::PublishResponse,
        ErrorBody,
        ErrorDetail,
    )),
    tags(
        (name = "updates", description = "Client update status"),
        (name = "sync", description = "Client synchronization"),
        (name = "publish", description = "Admin artifact publication"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(spec))
}

async fn spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_three_operations() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/atualizacao/{numero_serie}"));
        assert!(paths.contains_key("/sincronizar/{numero_serie}"));
        assert!(paths.contains_key("/admin/publicar"));
    }
}
