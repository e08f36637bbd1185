//! Authentication service implementation
//!
//! This service resolves who the session belongs to and what they may do.
//! The admin flag is re-derived from the `profiles` table on every request
//! and defaults to denied whenever the lookup fails.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::AuthUser;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::Role;
use crate::utils::errors::{ActionError, BackendResult};

/// Permission levels for dashboard operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// View pages and edit one's own profile
    Member,
    /// Manage events, resources, tags and users
    Admin,
}

/// Authentication context for the session user
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthUser,
    pub role: Role,
    pub permissions: HashSet<Permission>,
}

impl AuthContext {
    pub fn new(user: AuthUser, role: Role) -> Self {
        let mut permissions = HashSet::new();
        permissions.insert(Permission::Member);
        if role == Role::Admin {
            permissions.insert(Permission::Admin);
        }
        Self {
            user,
            role,
            permissions,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.contains(&Permission::Admin)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Authentication service for managing permissions and access control
#[derive(Clone)]
pub struct AuthService {
    settings: Settings,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Get authentication context for the session user
    ///
    /// Fails only when there is no valid session; a failed role lookup
    /// yields a member context.
    pub async fn get_auth_context(&self, db: &DatabaseService) -> BackendResult<AuthContext> {
        let user = db.current_user().await?;
        let role = match db.profiles.find_role(user.id).await {
            Ok(role) => role,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Role lookup failed, treating user as member");
                Role::Member
            }
        };

        debug!(user_id = %user.id, role = %role, "Authentication context created");
        Ok(AuthContext::new(user, role))
    }

    /// Check whether the session user is an admin; `false` on any failure
    pub async fn is_admin(&self, db: &DatabaseService) -> bool {
        match self.get_auth_context(db).await {
            Ok(context) => context.is_admin(),
            Err(e) => {
                debug!(error = %e, "No authenticated user for admin check");
                false
            }
        }
    }

    /// Require specific permission or return `Unauthorized`
    pub async fn require_permission(
        &self,
        db: &DatabaseService,
        required_permission: Permission,
    ) -> Result<AuthContext, ActionError> {
        let context = self
            .get_auth_context(db)
            .await
            .map_err(|_| ActionError::Unauthorized)?;

        if !context.has_permission(required_permission) {
            warn!(
                user_id = %context.user_id(),
                permission = ?required_permission,
                "Permission denied"
            );
            return Err(ActionError::Unauthorized);
        }

        Ok(context)
    }

    pub async fn require_admin(&self, db: &DatabaseService) -> Result<AuthContext, ActionError> {
        self.require_permission(db, Permission::Admin).await
    }

    /// Any signed-in user; ownership checks compare against `user_id()`
    pub async fn require_member(&self, db: &DatabaseService) -> Result<AuthContext, ActionError> {
        self.require_permission(db, Permission::Member).await
    }

    /// Hosted provider sign-in URL for the PKCE flow
    ///
    /// The verifier is sent as a `plain` challenge and must be kept in the
    /// verifier cookie until the callback exchanges the code.
    pub fn authorize_url(&self, code_verifier: &str) -> String {
        let redirect_to = format!("{}/auth/callback", self.settings.server.site_url.trim_end_matches('/'));
        format!(
            "{}/auth/v1/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=plain",
            self.settings.backend.url.trim_end_matches('/'),
            urlencoding::encode(&self.settings.auth.provider),
            urlencoding::encode(&redirect_to),
            urlencoding::encode(code_verifier)
        )
    }

    /// Fresh PKCE verifier (64 hex characters)
    pub fn new_code_verifier() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }
}
