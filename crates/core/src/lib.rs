//! `hirecast-core`: calendar and error primitives shared by the forecast crates.
//!
//! This crate contains **pure** building blocks (no I/O, no infrastructure concerns).

pub mod clock;
pub mod error;
pub mod month;
pub mod value_object;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use month::YearMonth;
pub use value_object::ValueObject;
