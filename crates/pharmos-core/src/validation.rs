//! # Validation Module
//!
//! Input validation for catalog mutations, sale requests and user accounts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (actix-web)                                     │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: business rule validation                        │
//! │  ├── required fields, lengths                                          │
//! │  └── prices ≥ 0, stock ≥ 0, 0 < quantity ≤ 999                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price_* >= 0)                          │
//! │  ├── UNIQUE barcode, UNIQUE email                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmos_core::validation::{validate_quantity, validate_stock};
//!
//! assert!(validate_quantity(3).is_ok());
//! assert!(validate_stock(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewItem, NewUser, SaleLineRequest, UserPatch};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 2000;
const MAX_BARCODE_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn validate_optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an item name.
///
/// ## Example
/// ```rust
/// use pharmos_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Amoxicillin 250mg").is_ok());
/// assert!(validate_item_name("  ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates a barcode: ASCII letters and digits, up to 64 characters.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    validate_required("barcode", barcode, MAX_BARCODE_LEN)?;

    if !barcode.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email, MAX_NAME_LEN)?;

    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };

    if !valid || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a new password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free samples).
///
/// ## Example
/// ```rust
/// use pharmos_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("priceSell", 1099).is_ok());
/// assert!(validate_price_cents("priceSell", 0).is_ok());
/// assert!(validate_price_cents("priceSell", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of an item about to be created or updated.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_optional("description", item.description.as_deref(), MAX_TEXT_LEN)?;
    validate_optional("category", item.category.as_deref(), MAX_NAME_LEN)?;
    if let Some(barcode) = &item.barcode {
        validate_barcode(barcode)?;
    }
    validate_price_cents("priceBuy", item.price_buy_cents)?;
    validate_price_cents("priceSell", item.price_sell_cents)?;
    validate_stock(item.stock)
}

/// Validates the shape of a sale request before any storage access.
///
/// ## Rules
/// - At least one line, at most MAX_SALE_LINES (100)
/// - Every quantity in `1..=999`
/// - Every line names an item
pub fn validate_sale_lines(lines: &[SaleLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for line in lines {
        if line.item_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "itemId".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    validate_required("name", &user.name, MAX_NAME_LEN)?;
    validate_email(&user.email)?;
    validate_password(&user.password)
}

pub fn validate_user_patch(patch: &UserPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_required("name", name, MAX_NAME_LEN)?;
    }
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    if let Some(password) = &patch.password {
        validate_password(password)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
