fn main() {
    if let Err(err) = orgflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
