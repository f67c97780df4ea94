//! Roster models: students and buses managed by a school.

use serde::{Deserialize, Serialize};

/// A student record.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub school_id: String,
    pub name: String,
    pub class: String,
    pub roll: String,
    pub address: String,
    /// Bus number the student rides (references `buses.bus_number`).
    pub bus: String,
    pub student_code: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A bus record.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: String,
    pub school_id: String,
    pub bus_number: String,
    pub car_number: String,
    pub driver_id: Option<String>,
    pub route: String,
    pub capacity: i64,
    pub student_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A bus joined with its assigned driver's name.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusWithDriver {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bus: Bus,
    pub driver_name: Option<String>,
}

/// Request to add a student. Fields default to empty so missing ones
/// surface as validation errors rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStudentRequest {
    pub name: String,
    pub class: String,
    pub roll: String,
    pub address: String,
    pub bus: String,
    pub student_code: String,
}

/// Partial update for a student.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub class: Option<String>,
    pub roll: Option<String>,
    pub address: Option<String>,
    pub bus: Option<String>,
    pub student_code: Option<String>,
}

/// Request to add a bus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBusRequest {
    pub bus_number: String,
    pub car_number: String,
    pub route: String,
    pub capacity: i64,
}

/// Request to assign a driver to a bus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignDriverRequest {
    pub bus_id: String,
    pub driver_id: String,
}
