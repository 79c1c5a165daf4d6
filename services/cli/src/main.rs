use shelter_cli::run;

fn main() {
    if let Err(err) = run() {
        eprintln!("shelter-cli: {err}");
        std::process::exit(if err.is_user_error() { 2 } else { 1 });
    }
}
