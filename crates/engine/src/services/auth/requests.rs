//! Typed authentication requests.
//!
//! Boundary adapters deserialize these from the wire and call `validate`
//! before handing them to the [`Authenticator`](super::Authenticator). The
//! email field is an [`Email`], so malformed addresses are already rejected
//! during deserialization.

use serde::Deserialize;
use thiserror::Error;

use bookshelf_core::{Email, Role, UserId};

use crate::models::User;

/// Minimum accepted length for a user-chosen password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Request validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("password confirmation does not match")]
    ConfirmationMismatch,
}

/// Registration form.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterRequest {
    /// Check the form before registration.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: blank names, a password shorter than
    /// [`MIN_PASSWORD_LENGTH`], or a mismatched confirmation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::Required("first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::Required("last name"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::ConfirmationMismatch);
        }
        Ok(())
    }

    /// Build the new customer. The password is still plaintext.
    pub(crate) fn into_user(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            role: Role::Customer,
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Login form.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl LoginRequest {
    /// Check the form before login.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Required` if the password is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Password reset form.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub email: Email,
}

impl PasswordResetRequest {
    /// Check the form before a reset.
    ///
    /// The only field is a parsed [`Email`], so there is nothing left to
    /// reject; the method exists so adapters treat every form alike.
    ///
    /// # Errors
    ///
    /// Never fails today.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register(password: &str, confirmation: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password: password.to_owned(),
            password_confirmation: confirmation.to_owned(),
        }
    }

    #[test]
    fn test_register_valid() {
        assert_eq!(register("secret1", "secret1").validate(), Ok(()));
    }

    #[test]
    fn test_register_blank_name() {
        let mut request = register("secret1", "secret1");
        request.last_name = "  ".to_owned();
        assert_eq!(
            request.validate(),
            Err(ValidationError::Required("last name"))
        );
    }

    #[test]
    fn test_register_short_password() {
        assert_eq!(
            register("pw", "pw").validate(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
    }

    #[test]
    fn test_register_confirmation_mismatch() {
        assert_eq!(
            register("secret1", "secret2").validate(),
            Err(ValidationError::ConfirmationMismatch)
        );
    }

    #[test]
    fn test_register_deserializes_camel_case() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com",
                "password":"secret1","passwordConfirmation":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.password_confirmation, "secret1");
    }

    #[test]
    fn test_register_rejects_bad_email_on_deserialize() {
        let result = serde_json::from_str::<RegisterRequest>(
            r#"{"firstName":"Ada","lastName":"Lovelace","email":"nope",
                "password":"secret1","passwordConfirmation":"secret1"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_user_is_customer_with_plaintext() {
        let user = register("pw", "pw").into_user(UserId::new("u1"));
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.password, "pw");
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_login_requires_password() {
        let request = LoginRequest {
            email: Email::parse("ada@example.com").unwrap(),
            password: String::new(),
        };
        assert_eq!(request.validate(), Err(ValidationError::Required("password")));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", register("hunter22", "hunter22"));
        assert!(!debug.contains("hunter22"));
    }
}
