#![allow(clippy::needless_range_loop)]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod elman;
pub mod error;
pub mod math;
pub mod rand_source;
pub mod rnn;

pub use crate::elman::*;
pub use crate::error::*;
pub use crate::math::*;
pub use crate::rand_source::*;
pub use crate::rnn::*;
