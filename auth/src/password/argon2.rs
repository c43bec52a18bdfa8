use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Output;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::errors::PasswordError;

/// Length of the random salt prefixed to every digest.
pub const SALT_LEN: usize = 16;

/// Length of the derived key stored after the salt.
pub const KEY_LEN: usize = 32;

/// Tunable cost parameters for key derivation.
///
/// Defaults follow the Argon2id recommendations shipped with the `argon2` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Digests are `base64(salt || key)`: a 16-byte random salt followed by a
/// 32-byte Argon2id key derived from the password and that salt.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a new password hasher with default cost parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a password hasher with explicit cost parameters.
    ///
    /// # Errors
    /// * `InvalidParams` - Argon2 rejected the parameter combination
    pub fn with_params(params: HashParams) -> Result<Self, PasswordError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    /// Hash a plaintext password.
    ///
    /// A fresh salt is drawn for every call, so hashing the same password
    /// twice yields two different digests.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Base64 encoded `salt || key` digest
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty
    /// * `HashingFailed` - Key derivation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = Self::fresh_salt();
        let key = self.derive(password, &salt)?;

        let mut digest = Vec::with_capacity(SALT_LEN + KEY_LEN);
        digest.extend_from_slice(&salt);
        digest.extend_from_slice(&key);

        Ok(STANDARD.encode(digest))
    }

    /// Verify a password against a stored digest.
    ///
    /// Malformed digests verify as `false`. The derived key is compared in
    /// constant time.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(bytes) = STANDARD.decode(digest) else {
            return false;
        };
        if bytes.len() != SALT_LEN + KEY_LEN {
            return false;
        }

        let (salt, stored) = bytes.split_at(SALT_LEN);
        let Ok(derived) = self.derive(password, salt) else {
            return false;
        };

        match (Output::new(&derived), Output::new(stored)) {
            (Ok(derived), Ok(stored)) => derived == stored,
            _ => false,
        }
    }

    /// Spend the same work as `verify` without checking anything.
    ///
    /// Used when there is no digest to check against, so that the caller's
    /// response time does not reveal it.
    pub fn simulate_verify(&self, password: &str) {
        let salt = Self::fresh_salt();
        let _ = self.derive(password, &salt);
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], PasswordError> {
        let mut key = [0u8; KEY_LEN];
        self.argon2()
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(key)
    }

    fn fresh_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    #[inline]
    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
