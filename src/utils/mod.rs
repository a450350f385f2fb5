pub mod auth;
pub mod flash;
pub mod validation;

pub use auth::{create_token, verify_token, Claims};
pub use flash::{set_flash, take_flash, Flash, FlashKind};
pub use validation::{password_strength, validate_email, PasswordStrength};
