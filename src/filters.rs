use std::fmt::Display;

// Amounts are shown in rupees, as the backend stores them.
pub fn currency<T: Display>(amount: T) -> askama::Result<String> {
    Ok(format!("₹{}", amount))
}
