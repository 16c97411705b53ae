fn main() {
    // Generates $OUT_DIR/built.rs with the git commit hash used by /health
    if let Err(e) = built::write_built_file() {
        panic!("Failed to acquire build-time information: {e}");
    }
}
