//! Capability checks for engine operations.
//!
//! The engine does not authenticate anyone. Whatever sits in front of it (an HTTP layer, the operator CLI) establishes
//! who is calling and passes that along as a [`Caller`]. Operations that are restricted call [`require_role`] before
//! doing any work.
use serde::{Deserialize, Serialize};

use crate::{db_types::Role, traits::ShopError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn new<S: Into<String>>(user_id: S, roles: &[Role]) -> Self {
        Self { user_id: user_id.into(), roles: roles.to_vec() }
    }

    pub fn user<S: Into<String>>(user_id: S) -> Self {
        Self::new(user_id, &[Role::User])
    }

    pub fn admin<S: Into<String>>(user_id: S) -> Self {
        Self::new(user_id, &[Role::User, Role::Admin])
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Fails with `ShopError::InsufficientPermissions` unless the caller holds `role`.
pub fn require_role(caller: &Caller, role: Role) -> Result<(), ShopError> {
    if caller.has_role(role) {
        Ok(())
    } else {
        log::warn!("🔐️ {} attempted an operation that requires the {role} role", caller.user_id);
        Err(ShopError::InsufficientPermissions(role))
    }
}
