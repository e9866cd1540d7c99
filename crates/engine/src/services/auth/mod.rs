//! Authentication service.
//!
//! Registration, password login and password reset over a credential store,
//! a password hasher, a token issuer and a notification sender.

mod error;
mod requests;

pub use error::AuthError;
pub use requests::{
    LoginRequest, MIN_PASSWORD_LENGTH, PasswordResetRequest, RegisterRequest, ValidationError,
};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use bookshelf_core::UserId;

use crate::context::Context;
use crate::effects::{Effect, Incomplete};
use crate::models::Credentials;
use crate::providers::{
    CredentialStore, IdGenerator, NotificationSender, PasswordGenerator, PasswordHasher,
    TokenIssuer,
};

/// Collaborators the [`Authenticator`] is built from.
#[derive(Clone)]
pub struct AuthCollaborators {
    pub users: Arc<dyn CredentialStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub passwords: Arc<dyn PasswordGenerator>,
    pub ids: Arc<dyn IdGenerator>,
    pub notifier: Arc<dyn NotificationSender>,
}

/// Authentication service.
///
/// Stateless: clone it or share it behind an `Arc` across tasks.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    passwords: Arc<dyn PasswordGenerator>,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn NotificationSender>,
}

impl Authenticator {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(collaborators: AuthCollaborators) -> Self {
        let AuthCollaborators {
            users,
            hasher,
            tokens,
            passwords,
            ids,
            notifier,
        } = collaborators;
        Self {
            users,
            hasher,
            tokens,
            passwords,
            ids,
            notifier,
        }
    }

    /// Register a new customer and issue their first token.
    ///
    /// Generates an ID, hashes the password, saves the user and issues a
    /// token, in that order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the failing collaborator's error unmodified. If token issuance
    /// fails the user is already saved, which is reported as
    /// [`Effect::UserSaved`].
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id(), email = %request.email))]
    pub async fn register(
        &self,
        ctx: &Context,
        request: RegisterRequest,
    ) -> Result<Credentials, Incomplete<AuthError>> {
        let id = UserId::new(self.ids.new_id());
        let mut user = request.into_user(id);

        user.password = self
            .hasher
            .hash(&user.password)
            .await
            .map_err(AuthError::from)?;

        self.users
            .save(ctx, &user)
            .await
            .map_err(AuthError::from)?;
        debug!(user_id = %user.id, "User saved");

        let token = self.tokens.issue_for(&user).map_err(|e| {
            warn!(user_id = %user.id, error = %e, "Token issuance failed after user was saved");
            Incomplete::new(AuthError::from(e), vec![Effect::UserSaved(user.id.clone())])
        })?;

        info!(user_id = %user.id, "User registered");
        Ok(Credentials::new(token))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongPassword` if the password does not match.
    /// Store errors (including not-found) and token errors propagate
    /// unmodified.
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id(), email = %request.email))]
    pub async fn login(
        &self,
        ctx: &Context,
        request: LoginRequest,
    ) -> Result<Credentials, AuthError> {
        let user = self.users.find_by_email(ctx, &request.email).await?;

        self.hasher
            .compare(&user.password, &request.password)
            .await
            .inspect_err(|e| debug!(user_id = %user.id, error = %e, "Password check failed"))?;

        let token = self.tokens.issue_for(&user)?;

        info!(user_id = %user.id, "User logged in");
        Ok(Credentials::new(token))
    }

    /// Replace a user's password with a generated one and email it to them.
    ///
    /// # Errors
    ///
    /// Returns the failing collaborator's error unmodified. If the
    /// notification fails the new hash is already stored, which is reported
    /// as [`Effect::PasswordUpdated`]; the user can no longer log in with
    /// the old password and never received the new one.
    #[instrument(skip(self, ctx, request), fields(request_id = %ctx.request_id(), email = %request.email))]
    pub async fn reset_password(
        &self,
        ctx: &Context,
        request: PasswordResetRequest,
    ) -> Result<(), Incomplete<AuthError>> {
        let mut user = self
            .users
            .find_by_email(ctx, &request.email)
            .await
            .map_err(AuthError::from)?;

        let new_password = self.passwords.generate();
        user.password = self
            .hasher
            .hash(&new_password)
            .await
            .map_err(AuthError::from)?;

        self.users
            .update(ctx, &user)
            .await
            .map_err(AuthError::from)?;
        debug!(user_id = %user.id, "Password hash updated");

        if let Err(e) = self
            .notifier
            .send_password_reset(ctx, &user, &new_password)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Reset email failed after password was updated");
            return Err(Incomplete::new(
                e.into(),
                vec![Effect::PasswordUpdated(user.id.clone())],
            ));
        }

        info!(user_id = %user.id, "Password reset");
        Ok(())
    }
}
