//! Roles and permissions: pure reference data with an id-based join table.

use sqlx::PgPool;

use crate::error::ServiceError;
use crate::models::{Permission, Role};

#[derive(Clone)]
pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_role(&self, name: &str) -> Result<Role, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "role name must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if super::is_unique_violation(&e) {
                    ServiceError::Validation(format!("role '{name}' already exists"))
                } else {
                    e.into()
                }
            })
    }

    pub async fn create_permission(&self, name: &str) -> Result<Permission, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "permission name must not be empty".to_string(),
            ));
        }

        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                ServiceError::Validation(format!("permission '{name}' already exists"))
            } else {
                e.into()
            }
        })
    }

    pub async fn grant_permission(
        &self,
        role_id: i64,
        permission_id: i64,
    ) -> Result<(), ServiceError> {
        let role_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?;
        if !role_exists {
            return Err(ServiceError::NotFound("role"));
        }
        let perm_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM permissions WHERE id = $1)")
                .bind(permission_id)
                .fetch_one(&self.pool)
                .await?;
        if !perm_exists {
            return Err(ServiceError::NotFound("permission"));
        }

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn permissions_for_role(
        &self,
        role_id: i64,
    ) -> Result<Vec<Permission>, ServiceError> {
        Ok(sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.name
             FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = $1
             ORDER BY p.name",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn delete_role(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("role"));
        }
        Ok(())
    }
}
