pub mod claims;
pub mod user;

pub use claims::*;
pub use user::*;
