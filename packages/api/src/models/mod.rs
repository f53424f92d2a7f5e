//! Data models for the application.

mod user;

#[cfg(feature = "server")]
pub mod library;
#[cfg(feature = "server")]
pub mod subscription;
#[cfg(feature = "server")]
pub mod workout;

#[cfg(feature = "server")]
pub use user::User;
pub use user::UserInfo;
