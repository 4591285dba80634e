fn main() {
    if let Err(e) = dicomcompare::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
