//! Bearer token issuing, authentication, and the claim set they carry.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::IdentityClaim;
pub use decoder::TokenAuthenticator;
pub use encoder::TokenIssuer;
