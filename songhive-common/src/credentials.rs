//! User credential hashing
//!
//! Passwords are stored as Argon2id PHC strings unless the deployment opts
//! into the legacy plaintext mode.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// How user passwords are stored and compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordMode {
    /// Argon2id PHC strings, verified on login
    #[default]
    Hashed,
    /// Stored verbatim, exact-match comparison
    Plaintext,
}

impl FromStr for PasswordMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hashed" => Ok(PasswordMode::Hashed),
            "plaintext" => Ok(PasswordMode::Plaintext),
            other => Err(Error::Config(format!("Unknown password mode '{}'", other))),
        }
    }
}

impl fmt::Display for PasswordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordMode::Hashed => f.write_str("hashed"),
            PasswordMode::Plaintext => f.write_str("plaintext"),
        }
    }
}

/// Hash a plaintext password into a PHC string with a fresh salt
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Credentials(e.to_string()))
}

/// True when `stored` parses as a PHC hash string
pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

/// Check `plain` against a stored PHC string; anything unparseable never matches
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(hash) => Argon2::default()
            .verify_password(plain.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Prepare a password for storage under `mode`; existing hashes are kept as is
pub fn protect_password(plain: &str, mode: PasswordMode) -> Result<String> {
    match mode {
        PasswordMode::Hashed if !is_password_hash(plain) => hash_password(plain),
        _ => Ok(plain.to_string()),
    }
}

/// Compare a login attempt against the stored password under `mode`
pub fn password_matches(attempt: &str, stored: &str, mode: PasswordMode) -> bool {
    match mode {
        PasswordMode::Hashed => verify_password(attempt, stored),
        PasswordMode::Plaintext => attempt == stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_hash_and_verify() {
        let hash = hash_password("123mypw").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(is_password_hash(&hash));
        assert!(verify_password("123mypw", &hash));
        assert!(!verify_password("not the pw", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn plaintext_never_verifies_as_hash() {
        assert!(!is_password_hash("hunter2"));
        assert!(!verify_password("hunter2", "hunter2"));
    }

    #[test]
    fn protect_respects_mode() {
        assert_eq!(
            protect_password("hunter2", PasswordMode::Plaintext).unwrap(),
            "hunter2"
        );

        let hashed = protect_password("hunter2", PasswordMode::Hashed).unwrap();
        assert!(is_password_hash(&hashed));
        assert_eq!(
            protect_password(&hashed, PasswordMode::Hashed).unwrap(),
            hashed
        );
    }

    #[test]
    fn plaintext_mode_is_exact_match() {
        assert!(password_matches("pw", "pw", PasswordMode::Plaintext));
        assert!(!password_matches("PW", "pw", PasswordMode::Plaintext));
        assert!(!password_matches("pw", "pw", PasswordMode::Hashed));
    }

    #[test]
    fn password_mode_parses_case_insensitively() {
        assert_eq!("Hashed".parse::<PasswordMode>().unwrap(), PasswordMode::Hashed);
        assert_eq!(
            "plaintext".parse::<PasswordMode>().unwrap(),
            PasswordMode::Plaintext
        );
        assert!("md5".parse::<PasswordMode>().is_err());
    }
}
