#![forbid(unsafe_code)]

/// `embed_migrations!` cannot tell when a migration file changes or is added,
/// so the crate is rebuilt whenever the migration directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
