//! # Validation Module
//!
//! Input validation for cart commands and account forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend forms                                               │
//! │  ├── required / pattern / minLength                                    │
//! │  └── Immediate shopper feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Same rules again, server side                                     │
//! │  └── Cart line checks before the stock oracle is asked                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (email, slug)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pasar_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("sari@example.com").unwrap();
//! validate_quantity(5, 999).unwrap();
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ProductId, ProfileUpdate, Registration};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length at sign-up.
pub const MIN_REGISTRATION_PASSWORD_LEN: usize = 6;

/// Minimum (trimmed) password length when changing it from the profile page.
pub const MIN_PROFILE_PASSWORD_LEN: usize = 5;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a cart line's product id.
pub fn validate_product_id(id: &ProductId) -> ValidationResult<()> {
    if id.is_blank() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }
    Ok(())
}

/// Validates a requested quantity from a form.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max`
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a display name: non-empty after trimming, at most 200 chars.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Sign-up email shape. The `.` between the two domain parts is unescaped
/// and matches any character, so a dotless domain such as `localhost` passes.
static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_.+-]+@[a-z0-9-]+.[a-z0-9.-]+$").ok());

/// Validates an email address in the sign-up form's shape.
///
/// ## Rules
/// - Local part: letters, digits, `_ . + -`
/// - Then `@`, a run of letters, digits and `-`, any one character, and a
///   run of letters, digits, `.` and `-`
/// - No surrounding whitespace
///
/// ## Example
/// ```rust
/// use pasar_core::validation::validate_email;
///
/// assert!(validate_email("budi.s+toko@mail.co.id").is_ok());
/// assert!(validate_email("budi@localhost").is_ok());
/// assert!(validate_email("budi@x").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    match EMAIL_PATTERN.as_ref() {
        Some(pattern) if pattern.is_match(email) => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        }),
    }
}

/// Validates a sign-up form.
///
/// ## Rules
/// - name required
/// - email required and well-formed
/// - password at least 6 characters
/// - confirmation equal to password
pub fn validate_registration(form: &Registration) -> ValidationResult<()> {
    validate_name(&form.name)?;
    validate_email(&form.email)?;

    if form.password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if form.password.chars().count() < MIN_REGISTRATION_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_REGISTRATION_PASSWORD_LEN,
        });
    }

    if form.confirm_password != form.password {
        return Err(ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
            other: "password".to_string(),
        });
    }

    Ok(())
}

/// Validates a profile update.
///
/// Looser than sign-up: the email only needs an `@`, and the password is
/// optional but, when given, must be at least 5 characters once trimmed.
pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult<()> {
    validate_name(&update.name)?;

    if update.email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if !update.email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "missing @".to_string(),
        });
    }

    if let Some(password) = update.new_password() {
        if password.trim().chars().count() < MIN_PROFILE_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: MIN_PROFILE_PASSWORD_LEN,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
