//! Request/Response DTOs
//!
//! Field names follow the JSON contract the web client already speaks.
//! Request fields are optional at the serde level so that a missing field is
//! answered with a 400 and a readable message instead of a decode error.

use inventory_db::{Product, ProductStatus, StockEntry};
use serde::{Deserialize, Serialize};

/// Treat an empty string the same as an absent field
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Plain acknowledgement
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub cedula: Option<String>,
    pub correo_electronico: Option<String>,
    pub contrasena: Option<String>,
    pub id_rol: Option<i64>,
}

/// Registration response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub correo_electronico: Option<String>,
    pub contrasena: Option<String>,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub usuario: LoginUser,
}

#[derive(Serialize)]
pub struct LoginUser {
    pub id: i64,
    pub rol: String,
}

/// Identity carried by the caller's token
#[derive(Serialize)]
pub struct IdentityResponse {
    pub message: &'static str,
    pub usuario_autenticado: AuthenticatedUser,
}

#[derive(Serialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub rol_id: i64,
}

// ==================== Product Types ====================

/// Create product request
#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub nombre_producto: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub codigo_barras: Option<String>,
    pub stock_actual: Option<i64>,
    pub stock_minimo: Option<i64>,
    pub stock_maximo: Option<i64>,
    pub ubicacion_bodega: Option<String>,
}

/// Update product request; absent fields are left unchanged
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub nombre_producto: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub stock_minimo: Option<i64>,
    pub stock_maximo: Option<i64>,
    pub ubicacion_bodega: Option<String>,
    pub estado: Option<ProductStatus>,
    pub stock_actual: Option<i64>,
}

/// Create product response
#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub message: &'static str,
    pub id: i64,
}

/// Product as listed to clients
#[derive(Serialize)]
pub struct ProductResponse {
    pub id_producto: i64,
    pub nombre_producto: String,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub color: Option<String>,
    pub codigo_barras: String,
    pub stock_actual: i64,
    pub stock_minimo: Option<i64>,
    pub stock_maximo: Option<i64>,
    pub ubicacion_bodega: Option<String>,
    pub estado: ProductStatus,
    pub fecha_creacion: String,
    pub fecha_actualizacion: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id_producto: p.id,
            nombre_producto: p.name,
            marca: p.brand,
            modelo: p.model,
            color: p.color,
            codigo_barras: p.barcode,
            stock_actual: p.current_stock,
            stock_minimo: p.min_stock,
            stock_maximo: p.max_stock,
            ubicacion_bodega: p.warehouse_location,
            estado: p.status,
            fecha_creacion: p.created_at.to_rfc3339(),
            fecha_actualizacion: p.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Stock Entry Types ====================

/// Goods receipt request
#[derive(Deserialize)]
pub struct StockEntryRequest {
    pub id_producto: Option<i64>,
    pub cantidad: Option<i64>,
    pub placa_vehiculo: Option<String>,
    pub nombre_chofer: Option<String>,
    pub observaciones: Option<String>,
}

/// Goods receipt acknowledgement
#[derive(Serialize)]
pub struct StockEntryCreatedResponse {
    pub message: &'static str,
    pub id_ingreso: i64,
}

/// Goods receipt history row
#[derive(Serialize)]
pub struct StockEntryResponse {
    pub id_ingreso: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub placa_vehiculo: Option<String>,
    pub nombre_chofer: Option<String>,
    pub observaciones: Option<String>,
    pub id_usuario: i64,
    pub fecha_ingreso: String,
}

impl From<StockEntry> for StockEntryResponse {
    fn from(e: StockEntry) -> Self {
        Self {
            id_ingreso: e.id,
            id_producto: e.product_id,
            cantidad: e.quantity,
            placa_vehiculo: e.vehicle_plate,
            nombre_chofer: e.driver_name,
            observaciones: e.notes,
            id_usuario: e.recorded_by,
            fecha_ingreso: e.recorded_at.to_rfc3339(),
        }
    }
}
