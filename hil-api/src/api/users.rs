use chrono::Utc;
use tracing::info;

use super::{Orchestrator, ensure_absent, labels, require};
use crate::error::{ApiError, Result};
use crate::model::{Group, User, new_id};
use crate::password;

impl Orchestrator {
    pub fn create_user(&self, label: &str, password: &str) -> Result<()> {
        let password_hash = password::hash_password(password)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

        self.store.with_transaction(|tx| {
            ensure_absent::<User>(tx, label)?;
            tx.create(&User {
                id: new_id(),
                label: label.to_string(),
                password_hash,
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        info!(user = %label, "Created user");
        self.audit.user_created(label);
        Ok(())
    }

    /// Delete a user along with its group memberships.
    pub fn delete_user(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let user = require::<User>(tx, label)?;
            for group in tx.groups_of_user(&user.id)? {
                tx.remove_membership(&user.id, &group.id)?;
            }
            tx.delete(&user)?;
            Ok::<_, ApiError>(())
        })?;

        info!(user = %label, "Deleted user");
        self.audit.user_deleted(label);
        Ok(())
    }

    /// Check a candidate password against the user's stored hash.
    pub fn verify_password(&self, label: &str, candidate: &str) -> Result<bool> {
        let user = self.store.read(|tx| require::<User>(tx, label))?;
        Ok(password::verify_password(&user.password_hash, candidate))
    }

    pub fn create_group(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            ensure_absent::<Group>(tx, label)?;
            tx.create(&Group {
                id: new_id(),
                label: label.to_string(),
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        info!(group = %label, "Created group");
        self.audit.group_created(label);
        Ok(())
    }

    /// Delete a group. Blocked while it owns projects; memberships go with it.
    pub fn delete_group(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let group = require::<Group>(tx, label)?;
            let projects = tx.projects_of_group(&group.id)?;
            if !projects.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "group '{}' still owns projects: {}",
                    label,
                    labels(projects).join(", ")
                )));
            }
            for user in tx.users_of_group(&group.id)? {
                tx.remove_membership(&user.id, &group.id)?;
            }
            tx.delete(&group)?;
            Ok(())
        })?;

        info!(group = %label, "Deleted group");
        self.audit.group_deleted(label);
        Ok(())
    }

    pub fn group_add_user(&self, group: &str, user: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let g = require::<Group>(tx, group)?;
            let u = require::<User>(tx, user)?;
            if tx.is_member(&u.id, &g.id)? {
                return Err(ApiError::Duplicate(format!(
                    "user '{}' in group '{}'",
                    user, group
                )));
            }
            tx.add_membership(&u.id, &g.id)?;
            Ok(())
        })?;

        info!(group = %group, user = %user, "Added user to group");
        self.audit.group_member_added(group, user);
        Ok(())
    }

    pub fn group_remove_user(&self, group: &str, user: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let g = require::<Group>(tx, group)?;
            let u = require::<User>(tx, user)?;
            if !tx.remove_membership(&u.id, &g.id)? {
                return Err(ApiError::NotFound(format!(
                    "user '{}' in group '{}'",
                    user, group
                )));
            }
            Ok(())
        })?;

        info!(group = %group, user = %user, "Removed user from group");
        self.audit.group_member_removed(group, user);
        Ok(())
    }

    pub fn list_group_users(&self, group: &str) -> Result<Vec<String>> {
        self.store.read(|tx| {
            let g = require::<Group>(tx, group)?;
            Ok(labels(tx.users_of_group(&g.id)?))
        })
    }
}
