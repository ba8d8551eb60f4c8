//! The module for the `spirvgen` CLI commands.

mod core;
mod ext;

pub use self::{core::*, ext::*};
