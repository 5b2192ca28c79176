//! Basic authentication header construction.

use crate::error::CredentialError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Turns a password stored encrypted at rest into plain text.
pub trait PasswordDecryptor: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be decrypted.
    fn decrypt(&self, encrypted: &str) -> Result<String, CredentialError>;
}

/// Decryptor for passwords that are stored in the clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPassword;

impl PasswordDecryptor for PlainPassword {
    fn decrypt(&self, encrypted: &str) -> Result<String, CredentialError> {
        Ok(encrypted.to_string())
    }
}

/// `base64(user:password)` with the password decrypted first.
///
/// # Errors
///
/// Returns the decryptor's error.
pub fn basic_credentials(
    user_name: &str,
    encrypted_password: &str,
    decryptor: &dyn PasswordDecryptor,
) -> Result<String, CredentialError> {
    let password = decryptor.decrypt(encrypted_password)?;
    Ok(STANDARD.encode(format!("{user_name}:{password}")))
}

/// Complete `Authorization: Basic …` header line.
///
/// # Errors
///
/// Returns the decryptor's error.
pub fn basic_authorization_header(
    user_name: &str,
    encrypted_password: &str,
    decryptor: &dyn PasswordDecryptor,
) -> Result<String, CredentialError> {
    let credentials = basic_credentials(user_name, encrypted_password, decryptor)?;
    Ok(format!("Authorization: Basic {credentials}"))
}
