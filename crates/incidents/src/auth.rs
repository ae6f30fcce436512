use crate::errors::ModelError;

/// bcrypt work factor the application uses for stored passwords.
pub const PASSWORD_COST: u32 = 10;

pub fn hash_password(password: &str, cost: u32) -> Result<String, ModelError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ModelError> {
    Ok(bcrypt::verify(password, hash)?)
}
