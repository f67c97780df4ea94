//! HTTP request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::{AuthError, RequireSchool, Role};
use crate::roster::{
    AssignDriverRequest, Bus, BusWithDriver, CreateBusRequest, CreateStudentRequest, Student,
    UpdateStudentRequest,
};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check endpoint.
///
/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// OTP

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Generate a one-time code and email it to the address.
///
/// POST /api/auth/send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> ApiResult<Json<Value>> {
    let email = request.email.as_deref().unwrap_or("").trim();
    if !crate::validate::is_valid_email(email) {
        return Err(ApiError::bad_request("A valid email is required"));
    }

    let code = state.otp.generate(email).await?;

    match &state.mailer {
        Some(mailer) => {
            mailer
                .send_otp(email, &code)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to send OTP email: {e}")))?;
        }
        None => {
            warn!("No mailer configured; OTP for {} was stored but not sent", email);
        }
    }

    Ok(Json(json!({"message": "OTP sent"})))
}

/// Check a one-time code. Codes are single-use.
///
/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> ApiResult<Json<Value>> {
    let email = request.email.as_deref().unwrap_or("").trim();
    let otp = request.otp.as_deref().unwrap_or("").trim();
    if email.is_empty() || otp.is_empty() {
        return Err(ApiError::bad_request("Email and OTP are required"));
    }

    state
        .otp
        .verify_and_consume(email, otp)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(json!({"message": "OTP verified"})))
}

// ---------------------------------------------------------------------------
// Accounts

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful signup/login response: a signed token plus the account.
#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub message: String,
    pub token: String,
    pub user: T,
}

fn login_fields(request: &LoginRequest) -> ApiResult<(&str, &str)> {
    let email = request.email.as_deref().unwrap_or("").trim();
    let password = request.password.as_deref().unwrap_or("");
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    Ok((email, password))
}

/// Register a school account.
///
/// POST /api/school/signup
pub async fn school_signup(
    State(state): State<AppState>,
    Json(request): Json<crate::school::RegisterSchoolRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse<crate::school::School>>)> {
    let school = state.schools.register(request).await?;
    let token = state.auth.issue_token(&school.id, Role::School)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "School registered".to_string(),
            token,
            user: school,
        }),
    ))
}

/// Log a school in.
///
/// POST /api/school/login
pub async fn school_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse<crate::school::School>>> {
    let (email, password) = login_fields(&request)?;

    let school = state
        .schools
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("No school account for this email"))?;

    if !state.schools.check_password(&school, password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.auth.issue_token(&school.id, Role::School)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: school,
    }))
}

/// Register a driver account. Gated by the registration code.
///
/// POST /api/driver/signup
pub async fn driver_signup(
    State(state): State<AppState>,
    Json(request): Json<crate::driver::RegisterDriverRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse<crate::driver::Driver>>)> {
    let submitted = request.driver_code.as_deref().unwrap_or("").trim();
    let valid = state
        .auth
        .driver_code()
        .is_some_and(|expected| expected == submitted);
    if !valid {
        return Err(ApiError::forbidden("Invalid driver code"));
    }

    let driver = state.drivers.register(request).await?;
    let token = state.auth.issue_token(&driver.id, Role::Driver)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Driver registered".to_string(),
            token,
            user: driver,
        }),
    ))
}

/// Log a driver in.
///
/// POST /api/driver/login
pub async fn driver_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse<crate::driver::Driver>>> {
    let (email, password) = login_fields(&request)?;

    let driver = state
        .drivers
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("No driver account for this email"))?;

    if !state.drivers.check_password(&driver, password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.auth.issue_token(&driver.id, Role::Driver)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: driver,
    }))
}

/// Register a parent account.
///
/// POST /api/parent/signup
pub async fn parent_signup(
    State(state): State<AppState>,
    Json(request): Json<crate::parent::RegisterParentRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse<crate::parent::Parent>>)> {
    let parent = state.parents.register(request).await?;
    let token = state.auth.issue_token(&parent.id, Role::Parent)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Parent registered".to_string(),
            token,
            user: parent,
        }),
    ))
}

/// Log a parent in.
///
/// POST /api/parent/login
pub async fn parent_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse<crate::parent::Parent>>> {
    let (email, password) = login_fields(&request)?;

    let parent = state
        .parents
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("No parent account for this email"))?;

    if !state.parents.check_password(&parent, password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.auth.issue_token(&parent.id, Role::Parent)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: parent,
    }))
}

// ---------------------------------------------------------------------------
// Roster (school-scoped)

/// Add a student to the calling school's roster.
///
/// POST /api/school/students
pub async fn add_student(
    school: RequireSchool,
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let student = state
        .roster
        .add_student(school.school_id(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// List the calling school's students.
///
/// GET /api/school/students
pub async fn list_students(
    school: RequireSchool,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Student>>> {
    let students = state.roster.list_students(school.school_id()).await?;
    Ok(Json(students))
}

/// Partially update a student.
///
/// PUT /api/school/students/{id}
pub async fn update_student(
    school: RequireSchool,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStudentRequest>,
) -> ApiResult<Json<Student>> {
    let student = state
        .roster
        .update_student(school.school_id(), &id, request)
        .await?;
    Ok(Json(student))
}

/// Remove a student from the roster.
///
/// DELETE /api/school/students/{id}
pub async fn delete_student(
    school: RequireSchool,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.roster.delete_student(school.school_id(), &id).await?;
    Ok(Json(json!({"message": "Student deleted"})))
}

/// Add a bus to the calling school's fleet.
///
/// POST /api/school/buses
pub async fn add_bus(
    school: RequireSchool,
    State(state): State<AppState>,
    Json(request): Json<CreateBusRequest>,
) -> ApiResult<(StatusCode, Json<Bus>)> {
    let bus = state.roster.add_bus(school.school_id(), request).await?;
    Ok((StatusCode::CREATED, Json(bus)))
}

/// List the calling school's buses with assigned driver names.
///
/// GET /api/school/buses
pub async fn list_buses(
    school: RequireSchool,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BusWithDriver>>> {
    let buses = state.roster.list_buses(school.school_id()).await?;
    Ok(Json(buses))
}

/// Assign a driver to one of the calling school's buses.
///
/// POST /api/school/buses/assign-driver
pub async fn assign_driver(
    school: RequireSchool,
    State(state): State<AppState>,
    Json(request): Json<AssignDriverRequest>,
) -> ApiResult<Json<Bus>> {
    let bus = state
        .roster
        .assign_driver(school.school_id(), &request.bus_id, &request.driver_id)
        .await?;
    Ok(Json(bus))
}

// ---------------------------------------------------------------------------
// Contact

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Forward a contact-form submission to the support inbox.
///
/// POST /api/contact
pub async fn contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> ApiResult<Json<Value>> {
    let name = request.name.as_deref().unwrap_or("").trim();
    let email = request.email.as_deref().unwrap_or("").trim();
    let message = request.message.as_deref().unwrap_or("").trim();

    if name.is_empty() || message.is_empty() {
        return Err(ApiError::bad_request("Name, email and message are required"));
    }
    if !crate::validate::is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let Some(mailer) = &state.mailer else {
        return Err(ApiError::service_unavailable("Email service not configured"));
    };

    mailer
        .send_contact(name, email, message)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to send contact email: {e}")))?;

    Ok(Json(json!({"message": "Message sent"})))
}
