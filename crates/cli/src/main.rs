fn main() {
    if let Err(e) = gnodriver_cli::run() {
        eprintln!("gnopackagesdriver: {e}");
        std::process::exit(1);
    }
}
