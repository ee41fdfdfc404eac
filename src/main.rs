/// Command-line entry point
///
/// This is a thin wrapper that delegates to the library crate.
fn main() {
    sessionize_lib::run();
}
