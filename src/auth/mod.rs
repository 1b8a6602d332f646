//! Authentication: password hashing, JWT, signup/login.

mod handlers;
mod jwt;
mod password;

pub use handlers::{login, me, signup, TokenResponse};
pub use jwt::{Claims, Identity, TokenIssuer};
pub use password::{hash_password, verify_password};
