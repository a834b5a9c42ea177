pub mod access;

pub use access::{RequestFilter, TokenSource};
