//! The `spirvgen` command line interface crate.
//!
//! This crate implements the `spirvgen` command line tool on top of
//! `spirvgen-meta`.

#![deny(missing_docs)]

pub mod commands;

pub(crate) mod common;
