//! Secret handling for operator-supplied credentials.

pub mod credentials;

pub use credentials::SecretString;
