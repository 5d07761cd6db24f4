// Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt;
use std::str::FromStr;

use crate::auth::error::AuthError;
use crate::config::DEFAULT_BCRYPT_COST;

/// bcrypt only reads this many bytes of input; anything longer is refused
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Algorithm used for newly created digests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Bcrypt,
    Argon2,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(HashAlgorithm::Bcrypt),
            "argon2" | "argon2id" => Ok(HashAlgorithm::Argon2),
            other => Err(format!("expected 'bcrypt' or 'argon2', got '{}'", other)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Bcrypt => write!(f, "bcrypt"),
            HashAlgorithm::Argon2 => write!(f, "argon2"),
        }
    }
}

/// Salted one-way password hashing
///
/// `verify` picks the algorithm from the digest itself, so accounts hashed
/// before a change of `algorithm` keep working.
#[derive(Debug, Clone)]
pub struct PasswordService {
    algorithm: HashAlgorithm,
    bcrypt_cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(HashAlgorithm::Bcrypt, DEFAULT_BCRYPT_COST)
    }
}

impl PasswordService {
    pub fn new(algorithm: HashAlgorithm, bcrypt_cost: u32) -> Self {
        Self {
            algorithm,
            bcrypt_cost,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        match self.algorithm {
            HashAlgorithm::Bcrypt => {
                if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
                    return Err(AuthError::ValidationError(format!(
                        "Password must be at most {} bytes",
                        BCRYPT_MAX_PASSWORD_BYTES
                    )));
                }
                bcrypt::hash(password, self.bcrypt_cost).map_err(|e| AuthError::PasswordHashError(e.to_string()))
            }
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AuthError::PasswordHashError(e.to_string()))
            }
        }
    }

    /// Verify a password against a stored digest
    ///
    /// Returns `Ok(false)` on mismatch. Only a digest that cannot be parsed
    /// is an error.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        if hash.starts_with("$argon2") {
            let parsed = PasswordHash::new(hash)
                .map_err(|e| AuthError::PasswordHashError(format!("invalid argon2 digest: {}", e)))?;
            return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AuthError::PasswordHashError(e.to_string())),
            };
        }

        // No bcrypt digest was made from a longer password, and bcrypt would
        // otherwise compare only the first 72 bytes
        if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(password, hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Lowest bcrypt cost keeps the suite fast; the algorithm is the same
    fn fast_bcrypt() -> PasswordService {
        PasswordService::new(HashAlgorithm::Bcrypt, 4)
    }

    #[test]
    fn test_default_uses_bcrypt_cost_10() {
        let service = PasswordService::default();
        assert_eq!(service.algorithm(), HashAlgorithm::Bcrypt);
        let hash = service.hash_password("pw").unwrap();
        assert!(hash.starts_with("$2b$10$"), "unexpected digest prefix: {}", hash);
    }

    #[test]
    fn test_hash_is_salted() {
        let service = fast_bcrypt();
        let first = service.hash_password("same password").unwrap();
        let second = service.hash_password("same password").unwrap();
        assert_ne!(first, second);
        assert!(service.verify_password("same password", &first).unwrap());
        assert!(service.verify_password("same password", &second).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = fast_bcrypt().hash_password("hunter2hunter2").unwrap();
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn test_mismatch_returns_false() {
        let service = fast_bcrypt();
        let hash = service.hash_password("correct").unwrap();
        assert!(!service.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_bcrypt_refuses_passwords_over_72_bytes() {
        let service = fast_bcrypt();
        let at_limit = "a".repeat(72);
        assert!(service.hash_password(&at_limit).is_ok());

        let err = service.hash_password(&format!("{}correct", at_limit)).unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));

        // 24 three-byte characters is 72 bytes; one more crosses the limit
        assert!(service.hash_password(&"€".repeat(24)).is_ok());
        assert!(service.hash_password(&"€".repeat(25)).is_err());
    }

    #[test]
    fn test_shared_72_byte_prefix_does_not_verify() {
        let service = fast_bcrypt();
        let prefix = "a".repeat(72);
        let hash = service.hash_password(&prefix).unwrap();

        assert!(service.verify_password(&prefix, &hash).unwrap());
        assert!(!service.verify_password(&format!("{}WRONG", prefix), &hash).unwrap());
    }

    #[test]
    fn test_argon2_accepts_long_passwords() {
        let service = PasswordService::new(HashAlgorithm::Argon2, 4);
        let prefix = "a".repeat(72);
        let hash = service.hash_password(&format!("{}correct", prefix)).unwrap();
        assert!(service.verify_password(&format!("{}correct", prefix), &hash).unwrap());
        assert!(!service.verify_password(&format!("{}WRONG", prefix), &hash).unwrap());
    }

    #[test]
    fn test_argon2_round_trip() {
        let service = PasswordService::new(HashAlgorithm::Argon2, 4);
        let hash = service.hash_password("pw").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify_password("pw", &hash).unwrap());
        assert!(!service.verify_password("other", &hash).unwrap());
    }

    #[test]
    fn test_verify_accepts_digests_from_either_algorithm() {
        let bcrypt_hash = fast_bcrypt().hash_password("pw").unwrap();
        let argon_hash = PasswordService::new(HashAlgorithm::Argon2, 4).hash_password("pw").unwrap();

        let argon_service = PasswordService::new(HashAlgorithm::Argon2, 4);
        assert!(argon_service.verify_password("pw", &bcrypt_hash).unwrap());
        assert!(fast_bcrypt().verify_password("pw", &argon_hash).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let service = fast_bcrypt();
        assert!(service.verify_password("pw", "not-a-digest").is_err());
        assert!(service.verify_password("pw", "$argon2id$garbage").is_err());
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("bcrypt".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Bcrypt);
        assert_eq!("Argon2id".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Argon2);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_verify_accepts_own_hash(password in "[ -~]{1,40}") {
            let service = fast_bcrypt();
            let hash = service.hash_password(&password)?;
            prop_assert!(service.verify_password(&password, &hash)?);
        }

        #[test]
        fn prop_verify_rejects_other_password(
            password in "[a-zA-Z0-9]{1,30}",
            other in "[a-zA-Z0-9]{1,30}"
        ) {
            prop_assume!(password != other);
            let service = fast_bcrypt();
            let hash = service.hash_password(&other)?;
            prop_assert!(!service.verify_password(&password, &hash)?);
        }

        #[test]
        fn prop_long_suffix_after_shared_prefix_is_rejected(
            prefix in "[a-z]{72}",
            suffix in "[a-zA-Z0-9]{1,20}"
        ) {
            let service = fast_bcrypt();
            let hash = service.hash_password(&prefix)?;
            let longer = format!("{}{}", prefix, suffix);
            prop_assert!(!service.verify_password(&longer, &hash)?);
            prop_assert!(service.hash_password(&longer).is_err());
        }
    }
}
