use thiserror::Error;

use crate::config::{self, Environment, PasswordConfig};

pub const PASSWORD_MAXIMUM_LENGTH: usize = 72;

const LOWERCASE_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = " !\"\\#$%&'()*+,-./:;<=>?@[]^_`|~";

/// The id names every requirement that was in force, so clients can render
/// the full rule set, not only the rule that failed.
#[derive(Error, Debug, PartialEq)]
#[error("password does not meet the requirements: {id}")]
pub struct PasswordPolicyError {
    pub id: String,
}

/// Validate a password against the configured policy. Development
/// deployments skip the policy entirely.
pub fn is_password_valid(password: &str) -> Result<(), PasswordPolicyError> {
    let cfg = config::config();

    if cfg.environment == Environment::Development {
        return Ok(());
    }

    is_password_valid_with_settings(password, &cfg.password)
}

pub fn is_password_valid_with_settings(
    password: &str,
    settings: &PasswordConfig,
) -> Result<(), PasswordPolicyError> {
    let mut id = String::from("password.requirements");
    let mut invalid =
        password.len() < settings.minimum_length || password.len() > PASSWORD_MAXIMUM_LENGTH;

    if settings.require_lowercase {
        if !password.chars().any(|ch| LOWERCASE_LETTERS.contains(ch)) {
            invalid = true;
        }
        id.push_str("_lowercase");
    }

    if settings.require_uppercase {
        if !password.chars().any(|ch| UPPERCASE_LETTERS.contains(ch)) {
            invalid = true;
        }
        id.push_str("_uppercase");
    }

    if settings.require_number {
        if !password.chars().any(|ch| NUMBERS.contains(ch)) {
            invalid = true;
        }
        id.push_str("_number");
    }

    if settings.require_symbol {
        if !password.chars().any(|ch| SYMBOLS.contains(ch)) {
            invalid = true;
        }
        id.push_str("_symbol");
    }

    if invalid {
        Err(PasswordPolicyError { id })
    } else {
        Ok(())
    }
}
