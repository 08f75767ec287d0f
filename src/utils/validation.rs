//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Accepts plain and brace-wrapped UUIDs
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[{]?[0-9a-fA-F]{8}-([0-9a-fA-F]{4}-){3}[0-9a-fA-F]{12}[}]?$").unwrap()
});

/// Regex for validating product (workspace) names
static PRODUCT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_\- ]+$").unwrap()
});

/// Regex for validating product keys
static PRODUCT_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_\-]+$").unwrap()
});

/// Validate a config table id
pub fn is_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

/// Validate a product name
pub fn validate_product_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 255 && PRODUCT_NAME_REGEX.is_match(name)
}

/// Validate a product key
pub fn validate_product_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= 100 && PRODUCT_KEY_REGEX.is_match(key)
}
