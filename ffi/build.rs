fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let header = std::path::Path::new(&crate_dir).join("include").join("resto.h");

    // A broken header should not block `cargo build`; surface it as a
    // warning and keep going.
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            if let Some(parent) = header.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            bindings.write_to_file(header);
        }
        Err(err) => println!("cargo:warning=failed to generate C header: {err}"),
    }
}
