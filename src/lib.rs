//! Purpose: Marshalling layer between host runtimes and the minify engine C ABI.
//! Exports: `core` (engine access, coercion, config/string/file marshalling),
//! `abi` (exported C surface for FFI hosts).
//! Role: One shared core; each embedding adds only its value-model translation.
//! Invariants: Every allocation crossing the boundary has one owner and one
//! release point on every exit path.
pub mod abi;
pub mod core;
