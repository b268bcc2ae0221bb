/*
Purpose: Link the Node binding against the minify engine library.
Exports: None (build script only).
Role: Resolve the libminify search path for the N-API addon.
Invariants: Uses MINIFY_LIB_DIR or repo-local lib/ outputs.
Notes: Fails fast when libminify cannot be located.
Notes: Reruns when MINIFY_LIB_DIR changes.
*/

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=MINIFY_LIB_DIR");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let repo_root = crate_dir
        .parent()
        .and_then(|path| path.parent())
        .and_then(|path| path.parent())
        .expect("bindings/node/native should be three levels below repo root")
        .to_path_buf();

    let candidates = env::var("MINIFY_LIB_DIR")
        .ok()
        .map(PathBuf::from)
        .into_iter()
        .chain([repo_root.join("lib"), repo_root.join("engine").join("lib")]);

    let mut found = None;
    for candidate in candidates {
        if candidate.exists() {
            found = Some(candidate);
            break;
        }
    }

    let lib_dir = found.unwrap_or_else(|| {
        panic!("libminify not found; set MINIFY_LIB_DIR or place libminify.* under lib/")
    });

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=minify");
}
