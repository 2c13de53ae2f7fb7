//! Encoder Module
//!
//! The two encoding layers under the mapping format: the 64-symbol
//! alphabet and the signed VLQ codec built on top of it.

pub mod base64;
pub mod vlq;
