pub mod auth;

pub use auth::AuthenticatedSubject;
