//! Build script for setlist-storage.
//!
//! Rebuild when the embedded byte store migrations change.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
