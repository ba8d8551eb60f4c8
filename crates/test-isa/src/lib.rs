//! The SPIR-V model generated from `grammar/` at build time.
//!
//! This crate exists to prove the generated code compiles and behaves; see
//! `tests/` for its checks.

pub mod enums {
    include!(concat!(env!("OUT_DIR"), "/enums.rs"));
}

pub mod names {
    include!(concat!(env!("OUT_DIR"), "/names.rs"));
}

pub mod instructions {
    include!(concat!(env!("OUT_DIR"), "/instructions.rs"));
}

pub mod visit {
    include!(concat!(env!("OUT_DIR"), "/visit.rs"));
}

pub mod opencl_std {
    include!(concat!(env!("OUT_DIR"), "/opencl_std.rs"));
}
