//! Sync-backed implementation of the `EmployeeService` trait.

use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::constants::{DEFAULT_EMPLOYEE_PASSWORD, auth::MIN_PASSWORD_LENGTH};
use crate::db::Store;
use crate::models::{Employee, LeaveRequest};
use crate::services::employee_service::{
    EmployeeError, EmployeeService, EmployeeUpdate, LoginOutcome, NewEmployee, Role,
};
use crate::sync::SyncCoordinator;

pub struct DefaultEmployeeService {
    store: Store,
    sync: Arc<SyncCoordinator>,
    security: SecurityConfig,
}

impl DefaultEmployeeService {
    #[must_use]
    pub fn new(store: Store, sync: Arc<SyncCoordinator>, security: SecurityConfig) -> Self {
        Self {
            store,
            sync,
            security,
        }
    }

    fn validate_profile(
        name: &str,
        probation_salary: f64,
        full_salary: f64,
    ) -> Result<(), EmployeeError> {
        if name.trim().is_empty() {
            return Err(EmployeeError::Validation("name is required".to_string()));
        }
        if probation_salary < 0.0 || full_salary < 0.0 {
            return Err(EmployeeError::Validation(
                "salaries cannot be negative".to_string(),
            ));
        }
        if probation_salary >= full_salary {
            return Err(EmployeeError::Validation(
                "probation salary must be lower than the full salary".to_string(),
            ));
        }
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<String, EmployeeError> {
        let password = password.to_string();
        let config = self.security.clone();

        // Argon2 is CPU-heavy; keep it off the async runtime.
        let hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")
            .map_err(EmployeeError::from)??;
        Ok(hash)
    }

    async fn fetch(&self, id: &str) -> Result<Employee, EmployeeError> {
        self.store
            .get_employee(id)
            .await
            .map_err(EmployeeError::from)?
            .map(|v| v.data)
            .ok_or_else(|| EmployeeError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl EmployeeService for DefaultEmployeeService {
    async fn create(&self, new: NewEmployee) -> Result<Employee, EmployeeError> {
        Self::validate_profile(&new.name, new.probation_salary, new.full_salary)?;

        let id = Employee::generate_id(&new.name, new.join_date);
        if self
            .store
            .get_employee(&id)
            .await
            .map_err(EmployeeError::from)?
            .is_some()
        {
            return Err(EmployeeError::Validation(format!(
                "employee id {id} already exists"
            )));
        }

        let password_hash = self.hash(DEFAULT_EMPLOYEE_PASSWORD).await?;

        let employee = Employee {
            id: id.clone(),
            name: new.name,
            job_title: new.job_title,
            gender: new.gender,
            join_date: new.join_date,
            probation_salary: new.probation_salary,
            full_salary: new.full_salary,
            probation_months: new.probation_months,
            password_hash,
            first_login: true,
        };

        self.sync
            .save(employee.clone())
            .await
            .map_err(EmployeeError::from)?;
        info!("Hired employee {} ({})", employee.name, id);
        Ok(employee)
    }

    async fn update(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, EmployeeError> {
        Self::validate_profile(&update.name, update.probation_salary, update.full_salary)?;

        let existing = self.fetch(id).await?;
        let employee = Employee {
            id: existing.id,
            name: update.name,
            job_title: update.job_title,
            gender: update.gender,
            join_date: update.join_date,
            probation_salary: update.probation_salary,
            full_salary: update.full_salary,
            probation_months: update.probation_months,
            password_hash: existing.password_hash,
            first_login: existing.first_login,
        };

        self.sync
            .save(employee.clone())
            .await
            .map_err(EmployeeError::from)?;
        Ok(employee)
    }

    async fn delete(&self, id: &str) -> Result<(), EmployeeError> {
        let employee = self.fetch(id).await?;

        // Business rule: leave requests go with the employee, salary records
        // stay for historical reporting.
        let leaves = self
            .store
            .list_leaves_for_employee(id)
            .await
            .map_err(EmployeeError::from)?;
        for leave in &leaves {
            self.sync
                .delete::<LeaveRequest>(&leave.data.id)
                .await
                .map_err(EmployeeError::from)?;
        }

        self.sync
            .delete::<Employee>(id)
            .await
            .map_err(EmployeeError::from)?;

        info!(
            "Removed employee {} ({}) and {} leave request(s)",
            employee.name,
            id,
            leaves.len()
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Employee>, EmployeeError> {
        self.sync
            .get_all::<Employee>()
            .await
            .map_err(EmployeeError::from)
    }

    async fn get(&self, id: &str) -> Result<Employee, EmployeeError> {
        self.fetch(id).await
    }

    async fn reset_password(&self, id: &str) -> Result<(), EmployeeError> {
        let mut employee = self.fetch(id).await?;
        employee.password_hash = self.hash(DEFAULT_EMPLOYEE_PASSWORD).await?;
        employee.first_login = true;

        self.sync.save(employee).await.map_err(EmployeeError::from)?;
        info!("Reset password for employee {id}");
        Ok(())
    }

    async fn change_password(&self, id: &str, new_password: &str) -> Result<(), EmployeeError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(EmployeeError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut employee = self.fetch(id).await?;
        employee.password_hash = self.hash(new_password).await?;
        employee.first_login = false;

        self.sync.save(employee).await.map_err(EmployeeError::from)?;
        Ok(())
    }

    async fn login(&self, login_id: &str, password: &str) -> Result<LoginOutcome, EmployeeError> {
        if login_id == self.security.admin_username {
            if password == self.security.admin_password {
                return Ok(LoginOutcome {
                    id: self.security.admin_username.clone(),
                    name: "Administrator".to_string(),
                    role: Role::Admin,
                    must_change_password: false,
                });
            }
            return Err(EmployeeError::InvalidCredentials);
        }

        let employee = self
            .store
            .get_employee(login_id)
            .await
            .map_err(EmployeeError::from)?
            .map(|v| v.data)
            .ok_or(EmployeeError::InvalidCredentials)?;

        let hash = employee.password_hash.clone();
        let candidate = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .context("Password verification task panicked")
            .map_err(EmployeeError::from)??;

        if !is_valid {
            return Err(EmployeeError::InvalidCredentials);
        }

        Ok(LoginOutcome {
            id: employee.id,
            name: employee.name,
            role: Role::Employee,
            must_change_password: employee.first_login,
        })
    }
}

/// Hash a password with Argon2id using the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
