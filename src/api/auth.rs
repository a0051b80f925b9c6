use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::services::Role;

const SESSION_USER_ID: &str = "user_id";
const SESSION_NAME: &str = "name";
const SESSION_ROLE: &str = "role";

/// The authenticated caller, reconstructed from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl SessionUser {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

pub async fn current_user(session: &Session) -> Result<SessionUser, ApiError> {
    let id: Option<String> = session
        .get(SESSION_USER_ID)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let name: Option<String> = session
        .get(SESSION_NAME)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let role: Option<String> = session
        .get(SESSION_ROLE)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    match (id, name, role) {
        (Some(id), Some(name), Some(role)) => {
            let role = if role == "ADMIN" {
                Role::Admin
            } else {
                Role::Employee
            };
            Ok(SessionUser { id, name, role })
        }
        _ => Err(ApiError::unauthorized("Not logged in")),
    }
}

pub async fn require_admin(session: &Session) -> Result<SessionUser, ApiError> {
    let user = current_user(session).await?;
    if !user.is_admin() {
        return Err(ApiError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }
    Ok(user)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let outcome = state
        .shared
        .employee_service
        .login(&request.username, &request.password)
        .await?;

    let role = match outcome.role {
        Role::Admin => "ADMIN",
        Role::Employee => "EMPLOYEE",
    };

    session
        .insert(SESSION_USER_ID, outcome.id.clone())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    session
        .insert(SESSION_NAME, outcome.name.clone())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    session
        .insert(SESSION_ROLE, role.to_string())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        id: outcome.id,
        name: outcome.name,
        role: role.to_string(),
        must_change_password: outcome.must_change_password,
    })))
}

pub async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(())))
}

/// Change the caller's own password; clears the first-login flag.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = current_user(&session).await?;
    if user.is_admin() {
        return Err(ApiError::validation(
            "the administrator password is managed in the config file",
        ));
    }

    state
        .shared
        .employee_service
        .change_password(&user.id, &request.new_password)
        .await?;

    Ok(Json(ApiResponse::success(())))
}
