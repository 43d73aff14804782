fn main() {
    if let Err(err) = vega_datasets::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
