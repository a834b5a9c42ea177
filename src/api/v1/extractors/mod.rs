pub mod verified;

pub use verified::{VerificationContext, Verified};
