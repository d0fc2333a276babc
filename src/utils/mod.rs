pub mod error;
pub mod extract;
pub mod links;
pub mod password;
pub mod response;

pub use error::{AppError, AppResult};
pub use links::{LinkBuilder, Resource};
pub use password::PasswordEncoder;
