//! Identity token verification.

pub mod identity;
