//! Concrete instrument drivers.

pub mod hp8131a;

pub use hp8131a::Hp8131a;
