//! Cryptographic utilities for the survey server

/// Default bcrypt cost factor
pub const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Generate a random token for session ids and anti-forgery tokens
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The single administrator account. The password only lives as a hash.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, bcrypt::BcryptError> {
        Self::with_cost(username, password, BCRYPT_COST)
    }

    /// Hash with an explicit cost; tests use the bcrypt minimum
    pub fn with_cost(
        username: &str,
        password: &str,
        cost: u32,
    ) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            username: username.to_string(),
            password_hash: hash_password(password, cost)?,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<bool, bcrypt::BcryptError> {
        // Always run bcrypt so a wrong username costs the same as a wrong password
        let password_ok = verify_password(password, &self.password_hash)?;
        Ok(password_ok && username == self.username)
    }
}
