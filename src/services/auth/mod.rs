pub mod authenticator;
pub mod claims;
pub mod error;
pub mod parser;
pub mod signing;
pub mod token;

pub use authenticator::Authenticator;
pub use claims::{Claims, NumericDates};
pub use error::AuthError;
pub use parser::{Parser, ParserSettings};
pub use signing::SigningMethod;
pub use token::{Header, Token, epoch_now};
