/// Password hashing with Argon2id
///
/// Stored secrets are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
/// parameters used at hashing time travel with the secret and verification never needs
/// the current configuration.
///
/// # Work Factor
///
/// The work factor is configurable through [`HashParams`] but cannot go below
/// [`HashParams::minimum`] (19 MiB memory, 2 passes, 1 lane). [`PasswordHasher::new`]
/// refuses anything weaker.
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::password::{HashParams, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(HashParams::minimum())?;
/// let secret = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify(&secret, "super_secret_password_123"));
/// assert!(!hasher.verify(&secret, "wrong_password"));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};

/// Output length of the raw hash in bytes.
const OUTPUT_LEN: usize = 32;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The hasher could not produce a secret (entropy or resource failure)
    #[error("Failed to hash password: {0}")]
    HashingFailure(String),

    /// Configured work factor is below the floor or rejected by Argon2
    #[error("Invalid password hash parameters: {0}")]
    InvalidParams(String),
}

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl HashParams {
    /// The weakest parameters the service will accept.
    pub const fn minimum() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }

    /// Checks the parameters against the floor.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` naming the first field below the floor.
    pub fn validate(&self) -> Result<(), PasswordError> {
        let floor = Self::minimum();

        if self.memory_kib < floor.memory_kib {
            return Err(PasswordError::InvalidParams(format!(
                "memory cost {} KiB is below the minimum of {} KiB",
                self.memory_kib, floor.memory_kib
            )));
        }
        if self.iterations < floor.iterations {
            return Err(PasswordError::InvalidParams(format!(
                "iteration count {} is below the minimum of {}",
                self.iterations, floor.iterations
            )));
        }
        if self.parallelism < floor.parallelism {
            return Err(PasswordError::InvalidParams(format!(
                "parallelism {} is below the minimum of {}",
                self.parallelism, floor.parallelism
            )));
        }

        Ok(())
    }

    fn to_argon2(self) -> Result<Params, PasswordError> {
        ParamsBuilder::new()
            .m_cost(self.memory_kib)
            .t_cost(self.iterations)
            .p_cost(self.parallelism)
            .output_len(OUTPUT_LEN)
            .build()
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))
    }
}

impl Default for HashParams {
    /// 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Hashes and verifies passwords with a fixed Argon2id work factor
///
/// Cheap to clone; handlers move a clone into `spawn_blocking` since both
/// operations are CPU-bound.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: HashParams,
    argon2_params: Params,
}

impl PasswordHasher {
    /// Creates a hasher after checking `params` against the floor.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if the work factor is too low.
    pub fn new(params: HashParams) -> Result<Self, PasswordError> {
        params.validate()?;
        let argon2_params = params.to_argon2()?;

        Ok(Self {
            params,
            argon2_params,
        })
    }

    /// Returns the configured work factor.
    pub fn params(&self) -> HashParams {
        self.params
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.argon2_params.clone())
    }

    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// Two calls with the same input yield different secrets.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashingFailure` only if Argon2 itself fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailure(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Checks `candidate` against a stored secret.
    ///
    /// Never fails: a malformed secret, a non-Argon2 secret or a wrong
    /// password all yield `false`. The comparison itself is constant-time.
    pub fn verify(&self, secret: &str, candidate: &str) -> bool {
        let parsed = match PasswordHash::new(secret) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password secret is malformed");
                return false;
            }
        };

        // Parameters come from the stored secret, not from self.params.
        self.argon2()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}
