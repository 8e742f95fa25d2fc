//! Product catalog and goods receipt routes
//!
//! Every route here requires a bearer token. Writes additionally carry a
//! role allow-list, declared next to the route it guards.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use inventory_auth::{AuthUser, RoleAllowList, require_auth, require_roles};
use inventory_db::{NewProduct, NewStockEntry, Role, UpdateProduct};
use tracing::{error, info};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

use super::types::{
    AuthenticatedUser, CreateProductRequest, IdentityResponse, MessageResponse,
    ProductCreatedResponse, ProductResponse, StockEntryCreatedResponse, StockEntryRequest,
    StockEntryResponse, UpdateProductRequest, present,
};

/// Create and edit products
const CATALOG_EDITORS: RoleAllowList = RoleAllowList::new(&[Role::Manager, Role::Supervisor]);
/// Archive products
const ARCHIVERS: RoleAllowList = RoleAllowList::new(&[Role::Manager]);
/// Record goods receipts
const RECEIVERS: RoleAllowList =
    RoleAllowList::new(&[Role::Manager, Role::Supervisor, Role::OperationsLead]);

// ==================== Product Routes ====================

/// GET /api/inventario
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.db.list_products().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// POST /api/inventario (Manager, Supervisor)
async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    let (Some(name), Some(barcode)) = (
        present(request.nombre_producto),
        present(request.codigo_barras),
    ) else {
        return Err(ApiError::bad_request("Faltan datos obligatorios."));
    };

    let product = state
        .db
        .create_product(NewProduct {
            name,
            brand: request.marca,
            model: request.modelo,
            color: request.color,
            barcode,
            current_stock: request.stock_actual.unwrap_or(0),
            min_stock: request.stock_minimo,
            max_stock: request.stock_maximo,
            warehouse_location: request.ubicacion_bodega,
        })
        .await?;

    info!(
        "Product {} ({}) created by user {}",
        product.id, product.barcode, user.id
    );

    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            message: "Producto creado",
            id: product.id,
        }),
    ))
}

/// PUT /api/inventario/{id} (Manager, Supervisor)
async fn update_product(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let product = state
        .db
        .update_product(
            id,
            UpdateProduct {
                name: present(request.nombre_producto),
                brand: request.marca,
                model: request.modelo,
                color: request.color,
                min_stock: request.stock_minimo,
                max_stock: request.stock_maximo,
                warehouse_location: request.ubicacion_bodega,
                status: request.estado,
                current_stock: request.stock_actual,
            },
        )
        .await?;

    info!(
        "Product {} updated by user {} (status {}, stock {})",
        product.id,
        user.id,
        product.status.as_str(),
        product.current_stock
    );

    Ok(Json(MessageResponse {
        message: "Producto actualizado correctamente",
    }))
}

/// DELETE /api/inventario/{id} (Manager)
///
/// Soft delete: the product is marked inactive and its history is kept.
async fn archive_product(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.archive_product(id).await?;

    info!("Product {} archived by user {}", id, user.id);

    Ok(Json(MessageResponse {
        message: "Producto archivado (Historial preservado)",
    }))
}

// ==================== Stock Entry Routes ====================

/// POST /api/inventario/ingreso (Manager, Supervisor, OperationsLead)
///
/// The entry is attributed to the authenticated caller, never to a user id
/// taken from the body.
async fn record_stock_entry(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StockEntryRequest>,
) -> Result<(StatusCode, Json<StockEntryCreatedResponse>), ApiError> {
    let (Some(product_id), Some(quantity)) = (
        request.id_producto.filter(|&id| id != 0),
        request.cantidad.filter(|&q| q > 0),
    ) else {
        return Err(ApiError::bad_request(
            "Datos incompletos o cantidad inválida.",
        ));
    };

    let entry = state
        .db
        .record_stock_entry(NewStockEntry {
            product_id,
            quantity,
            vehicle_plate: request.placa_vehiculo,
            driver_name: request.nombre_chofer,
            notes: request.observaciones,
            recorded_by: user.id,
        })
        .await
        .map_err(|e| {
            error!("Stock entry for product {} failed: {}", product_id, e);
            ApiError::Internal("Error al procesar el ingreso.".to_string())
        })?;

    metrics::counter!("inventory_stock_entries_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(StockEntryCreatedResponse {
            message: "✅ Ingreso registrado y Stock actualizado.",
            id_ingreso: entry.id,
        }),
    ))
}

/// GET /api/inventario/{id}/ingresos
async fn list_stock_entries(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<StockEntryResponse>>, ApiError> {
    if state.db.get_product(id).await?.is_none() {
        return Err(ApiError::NotFound("Producto no encontrado".to_string()));
    }

    let entries = state.db.list_stock_entries(id).await?;
    Ok(Json(entries.into_iter().map(StockEntryResponse::from).collect()))
}

/// GET /api/inventario/test-protegida
async fn identity(user: AuthUser) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        message: "✅ Acceso a ruta protegida exitoso. Token verificado.",
        usuario_autenticado: AuthenticatedUser {
            id: user.id,
            rol_id: user.role.id(),
        },
    })
}

/// Create inventory routes
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_products)
                .merge(post(create_product).route_layer(from_fn_with_state(
                    CATALOG_EDITORS,
                    require_roles,
                ))),
        )
        .route(
            "/{id}",
            put(update_product)
                .route_layer(from_fn_with_state(CATALOG_EDITORS, require_roles))
                .merge(
                    delete(archive_product)
                        .route_layer(from_fn_with_state(ARCHIVERS, require_roles)),
                ),
        )
        .route(
            "/ingreso",
            post(record_stock_entry).route_layer(from_fn_with_state(RECEIVERS, require_roles)),
        )
        .route("/{id}/ingresos", get(list_stock_entries))
        .route("/test-protegida", get(identity))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_auth))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use futures::future::join_all;
    use inventory_db::{ProductStatus, Role};
    use serde_json::json;

    use crate::routes::testing::TestApp;

    #[tokio::test]
    async fn test_listing_requires_a_token() {
        let app = TestApp::new().await;
        let (status, body) = app.call(Method::GET, "/api/inventario", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            "Acceso denegado. No se proporcionó token o formato incorrecto."
        );
    }

    #[tokio::test]
    async fn test_any_role_can_list_products() {
        let app = TestApp::new().await;
        app.product("A-1", 0).await;
        app.product("A-2", 4).await;
        let token = app.token_for(Role::Clerk).await;

        let (status, body) = app
            .call(Method::GET, "/api/inventario", Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["codigo_barras"], "A-2");
        assert_eq!(products[0]["estado"], "ACTIVO");
    }

    #[tokio::test]
    async fn test_identity_echo() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Supervisor).await;

        let (status, body) = app
            .call(Method::GET, "/api/inventario/test-protegida", Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usuario_autenticado"]["rol_id"], 2);
        assert!(body["usuario_autenticado"]["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn test_create_product() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Manager).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario",
                Some(&token),
                Some(json!({
                    "nombre_producto": "Cemento",
                    "codigo_barras": "CEM-1",
                    "stock_minimo": 2,
                    "stock_maximo": 50
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Producto creado");
        let id = body["id"].as_i64().unwrap();

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 0);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_create_product_validation_and_conflict() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Supervisor).await;
        app.product("DUP-1", 0).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario",
                Some(&token),
                Some(json!({ "nombre_producto": "Sin código" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Faltan datos obligatorios.");

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario",
                Some(&token),
                Some(json!({ "nombre_producto": "Otro", "codigo_barras": "DUP-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "El Código de Barras ya existe.");
    }

    #[tokio::test]
    async fn test_clerk_cannot_write_catalog() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Clerk).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario",
                Some(&token),
                Some(json!({ "nombre_producto": "X", "codigo_barras": "X-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            "Acceso denegado. Su rol no tiene permisos para esta acción."
        );

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/inventario/{id}"),
                Some(&token),
                Some(json!({ "nombre_producto": "Renombrado" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Producto A-1");
    }

    #[tokio::test]
    async fn test_update_product() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 3).await;
        let token = app.token_for(Role::Supervisor).await;

        let (status, body) = app
            .call(
                Method::PUT,
                &format!("/api/inventario/{id}"),
                Some(&token),
                Some(json!({ "nombre_producto": "Cemento gris", "ubicacion_bodega": "B-12" })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Producto actualizado correctamente");
        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Cemento gris");
        assert_eq!(product.warehouse_location.as_deref(), Some("B-12"));
        assert_eq!(product.current_stock, 3);
    }

    #[tokio::test]
    async fn test_update_cannot_deactivate_stocked_product() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 3).await;
        let token = app.token_for(Role::Manager).await;

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/inventario/{id}"),
                Some(&token),
                Some(json!({ "estado": "INACTIVO" })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Manager).await;

        let (status, _) = app
            .call(
                Method::PUT,
                "/api/inventario/999",
                Some(&token),
                Some(json!({ "nombre_producto": "Nada" })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_archive_with_stock_is_refused() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::Manager).await;

        let (status, body) = app
            .call(Method::DELETE, &format!("/api/inventario/{id}"), Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "No se puede descontinuar un producto con Stock físico activo."
        );
        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_archive_without_stock() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Manager).await;

        for _ in 0..2 {
            let (status, body) = app
                .call(Method::DELETE, &format!("/api/inventario/{id}"), Some(&token), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Producto archivado (Historial preservado)");
        }

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Inactive);
    }

    #[tokio::test]
    async fn test_archive_after_clearing_stock() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::Manager).await;
        let uri = format!("/api/inventario/{id}");

        let (status, _) = app.call(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .call(Method::PUT, &uri, Some(&token), Some(json!({ "stock_actual": 0 })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.call(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.current_stock, 0);
    }

    #[tokio::test]
    async fn test_only_managers_archive() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Supervisor).await;

        let (status, _) = app
            .call(Method::DELETE, &format!("/api/inventario/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_archive_missing_product_is_not_found() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Manager).await;

        let (status, body) = app
            .call(Method::DELETE, "/api/inventario/404", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Producto no encontrado");
    }

    #[tokio::test]
    async fn test_stock_entry_increments_and_is_attributed() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::OperationsLead).await;
        let caller = app.state.tokens.verify(&token).unwrap();

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({
                    "id_producto": id,
                    "cantidad": 10,
                    "placa_vehiculo": "PBX-1234",
                    "nombre_chofer": "Luis"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "✅ Ingreso registrado y Stock actualizado.");

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 15);

        let (status, history) = app
            .call(
                Method::GET,
                &format!("/api/inventario/{id}/ingresos"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["cantidad"], 10);
        assert_eq!(history[0]["id_usuario"], caller.id);
    }

    #[tokio::test]
    async fn test_stock_entry_validation() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::Manager).await;

        for payload in [
            json!({ "id_producto": id, "cantidad": 0 }),
            json!({ "id_producto": id, "cantidad": -4 }),
            json!({ "cantidad": 3 }),
            json!({ "id_producto": id }),
        ] {
            let (status, body) = app
                .call(Method::POST, "/api/inventario/ingreso", Some(&token), Some(payload))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Datos incompletos o cantidad inválida.");
        }

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 5);
    }

    #[tokio::test]
    async fn test_stock_entry_for_unknown_product_fails_cleanly() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Supervisor).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({ "id_producto": 777, "cantidad": 2 })),
            )
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error al procesar el ingreso.");
    }

    #[tokio::test]
    async fn test_clerk_cannot_record_stock_entry() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::Clerk).await;

        let (status, _) = app
            .call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({ "id_producto": id, "cantidad": 1 })),
            )
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 5);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_json_bad_request() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 5).await;
        let token = app.token_for(Role::OperationsLead).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({ "id_producto": id, "cantidad": "5" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Datos inválidos.");

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 5);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_json_bad_request() {
        let app = TestApp::new().await;
        let token = app.token_for(Role::Manager).await;

        let (status, body) = app
            .call(Method::DELETE, "/api/inventario/abc", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Identificador inválido.");

        let (status, body) = app
            .call(
                Method::PUT,
                "/api/inventario/abc",
                Some(&token),
                Some(json!({ "color": "Rojo" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Identificador inválido.");

        let (status, body) = app
            .call(Method::GET, "/api/inventario/abc/ingresos", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Identificador inválido.");
    }

    #[tokio::test]
    async fn test_update_body_must_be_json() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Supervisor).await;

        let (status, body) = app
            .call_raw(
                Method::PUT,
                &format!("/api/inventario/{}", id),
                Some(&token),
                Some("text/plain"),
                "color=Rojo",
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Datos inválidos.");
    }

    #[tokio::test]
    async fn test_renaming_archived_product_after_late_receipt() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Manager).await;

        let (status, _) = app
            .call(Method::DELETE, &format!("/api/inventario/{}", id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({ "id_producto": id, "cantidad": 4 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = app
            .call(
                Method::PUT,
                &format!("/api/inventario/{}", id),
                Some(&token),
                Some(json!({ "nombre_producto": "Renombrado" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Renombrado");
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.current_stock, 4);
    }

    #[tokio::test]
    async fn test_many_entries_accumulate() {
        let app = TestApp::new().await;
        let id = app.product("A-1", 0).await;
        let token = app.token_for(Role::Manager).await;

        let requests = (0..8).map(|_| {
            app.call(
                Method::POST,
                "/api/inventario/ingreso",
                Some(&token),
                Some(json!({ "id_producto": id, "cantidad": 3 })),
            )
        });
        for (status, _) in join_all(requests).await {
            assert_eq!(status, StatusCode::CREATED);
        }

        let product = app.state.db.get_product(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 24);
        assert_eq!(app.state.db.list_stock_entries(id).await.unwrap().len(), 8);
    }
}
