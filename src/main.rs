//! Hash module resolver CLI entry point

fn main() {
    hashc::cli::run();
}
