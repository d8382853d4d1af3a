pub mod assume;
pub mod credentials;
pub mod mfa;
