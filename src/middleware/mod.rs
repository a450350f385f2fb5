pub mod permission;
pub mod session;

pub use permission::{get_current_user, require_role, CurrentUser};
pub use session::{bearer_for, login, logout, SessionStore, AUTH_COOKIE};
