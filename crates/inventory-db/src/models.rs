//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidRole(String),
    InvalidProductStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
            ParseError::InvalidProductStatus(s) => write!(f, "Invalid product status: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
///
/// The numeric ids are the primary keys of the seeded `roles` table and are
/// what clients send as `id_rol`. Route allow-lists are written in terms of
/// these variants, never the raw ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Manager,
    Supervisor,
    Clerk,
    OperationsLead,
}

impl Role {
    /// Every role, in id order
    pub const ALL: [Role; 4] = [
        Role::Manager,
        Role::Supervisor,
        Role::Clerk,
        Role::OperationsLead,
    ];

    pub fn id(&self) -> i64 {
        match self {
            Role::Manager => 1,
            Role::Supervisor => 2,
            Role::Clerk => 3,
            Role::OperationsLead => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Clerk => "clerk",
            Role::OperationsLead => "operations-lead",
        }
    }

    /// Name stored in the `roles` table
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Gerente",
            Role::Supervisor => "Jefe Administrativo",
            Role::Clerk => "Asistente de Bodega",
            Role::OperationsLead => "Jefe de Operaciones",
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = ParseError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Role::from_id(id).ok_or_else(|| ParseError::InvalidRole(id.to_string()))
    }
}

/// Role reference row
#[derive(Debug, Clone)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

/// User model, joined with its role name
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub role_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
}

/// Product lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProductStatus {
    #[default]
    #[serde(rename = "ACTIVO")]
    Active,
    #[serde(rename = "INACTIVO")]
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVO",
            ProductStatus::Inactive => "INACTIVO",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVO" => Ok(ProductStatus::Active),
            "INACTIVO" => Ok(ProductStatus::Inactive),
            _ => Err(ParseError::InvalidProductStatus(s.to_string())),
        }
    }
}

/// Product model
#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub barcode: String,
    pub current_stock: i64,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub warehouse_location: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New product (for insertion)
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub barcode: String,
    pub current_stock: i64,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub warehouse_location: Option<String>,
}

/// Update product (for partial updates)
///
/// `current_stock` is the direct-edit path for the running balance; goods
/// receipts go through [`crate::Database::record_stock_entry`] instead.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub warehouse_location: Option<String>,
    pub status: Option<ProductStatus>,
    pub current_stock: Option<i64>,
}

/// Goods receipt audit record
#[derive(Debug, Clone)]
pub struct StockEntry {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub vehicle_plate: Option<String>,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: i64,
    pub recorded_at: DateTime<Utc>,
}

/// New goods receipt (for insertion)
#[derive(Debug, Clone)]
pub struct NewStockEntry {
    pub product_id: i64,
    pub quantity: i64,
    pub vehicle_plate: Option<String>,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: i64,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for RoleRecord {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(RoleRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_id: i64 = row.try_get("role_id")?;
        let role = Role::try_from(role_id).map_err(|e| sqlx::Error::ColumnDecode {
            index: "role_id".to_string(),
            source: Box::new(e),
        })?;
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            role_name: row.try_get("role_name")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            national_id: row.try_get("national_id")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Product {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        let status = ProductStatus::from_str(&status_str).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            color: row.try_get("color")?,
            barcode: row.try_get("barcode")?,
            current_stock: row.try_get("current_stock")?,
            min_stock: row.try_get("min_stock")?,
            max_stock: row.try_get("max_stock")?,
            warehouse_location: row.try_get("warehouse_location")?,
            status,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for StockEntry {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(StockEntry {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            vehicle_plate: row.try_get("vehicle_plate")?,
            driver_name: row.try_get("driver_name")?,
            notes: row.try_get("notes")?,
            recorded_by: row.try_get("recorded_by")?,
            recorded_at: parse_datetime_or_now(&row.try_get::<String, _>("recorded_at")?),
        })
    }
}
