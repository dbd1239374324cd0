#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod error;
mod generator;
mod layout;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::codec::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
