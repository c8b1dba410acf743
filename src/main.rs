fn main() {
    if let Err(err) = svault_cli::run_cli() {
        svault_logger::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
