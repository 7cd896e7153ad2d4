use std::path::PathBuf;

use garde::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, Result};

/// The login form.
#[derive(Validate, Zeroize, ZeroizeOnDrop)]
pub struct LoginForm {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

/// The registration form.
#[derive(Validate, Zeroize, ZeroizeOnDrop)]
pub struct RegisterForm {
    #[garde(length(min = 3, max = 255), custom(username_charset))]
    pub username: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
    #[garde(skip)]
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks the passwords match first, then the field rules.
    pub fn check(&self) -> Result<()> {
        validate_passwords_match(&self.password, &self.confirm_password)?;
        self.validate()?;
        Ok(())
    }
}

/// The video upload form.
#[derive(Validate)]
pub struct UploadForm {
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(length(min = 1, max = 100))]
    pub category: String,
    #[garde(length(max = 5000))]
    pub description: String,
    #[garde(skip)]
    pub file: Option<PathBuf>,
}

impl UploadForm {
    /// Checks a file was selected, then the field rules.
    ///
    /// Returns the selected file path.
    pub fn check(&self) -> Result<&PathBuf> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| AppError::Validation("Please select a video file to upload".to_string()))?;
        self.validate()?;
        Ok(file)
    }
}

/// Validates that both password entries are equal.
pub fn validate_passwords_match(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

fn username_charset(value: &str, _ctx: &()) -> garde::Result {
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(garde::Error::new(
            "can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_mismatched_passwords_first() {
        let form = RegisterForm::new("x", "bad", "Secret123!", "Secret124!");
        let err = form.check().unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
    }

    #[test]
    fn register_field_rules() {
        assert!(RegisterForm::new("ana_b", "ana@x.io", "Secret123!", "Secret123!").check().is_ok());
        assert!(RegisterForm::new("an", "ana@x.io", "Secret123!", "Secret123!").check().is_err());
        assert!(RegisterForm::new("ana b", "ana@x.io", "Secret123!", "Secret123!").check().is_err());
        assert!(RegisterForm::new("ana", "not-an-email", "Secret123!", "Secret123!").check().is_err());
        assert!(RegisterForm::new("ana", "ana@x.io", "short", "short").check().is_err());
    }

    #[test]
    fn login_requires_an_email() {
        assert!(LoginForm::new("ana@x.io", "pw").check().is_ok());
        let err = LoginForm::new("ana", "pw").check().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn upload_requires_a_file() {
        let form = UploadForm {
            title: "Intro".to_string(),
            category: "docs".to_string(),
            description: String::new(),
            file: None,
        };
        let err = form.check().unwrap_err();
        assert_eq!(err.user_message(), "Please select a video file to upload");
    }
}
