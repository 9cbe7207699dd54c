pub mod password;
pub mod token;

pub use password::{Argon2Hasher, HashingError, PasswordHasher};
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
