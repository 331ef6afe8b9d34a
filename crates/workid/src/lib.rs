#![doc = include_str!("../README.md")]

mod allocator;
mod config;
mod error;
mod key;
mod lease;
mod memory;
mod store;

pub use crate::allocator::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::key::*;
pub use crate::lease::*;
pub use crate::memory::*;
pub use crate::store::*;
