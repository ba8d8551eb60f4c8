use spirvgen_meta as meta;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=grammar");

    let out_dir = env::var("OUT_DIR").expect("The OUT_DIR environment variable must be set");
    let out_dir = PathBuf::from(out_dir);
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let grammar = Path::new(&manifest_dir).join("grammar");

    let filter = meta::Filter::load(grammar.join("test.filter.json"))
        .unwrap_or_else(|e| panic!("failed to load the test filter: {e}"));
    meta::generate_core(
        &grammar.join("spirv.core.grammar.json"),
        &filter,
        &out_dir,
        None,
    )
    .unwrap_or_else(|e| panic!("failed to generate the core model: {e}"));
    meta::generate_extension(
        "OpenCL.std",
        &grammar.join("extinst.opencl.std.100.grammar.json"),
        &out_dir,
        None,
    )
    .unwrap_or_else(|e| panic!("failed to generate OpenCL.std: {e}"));
}
