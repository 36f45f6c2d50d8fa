use std::ffi::OsString;

fn main() {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if args.is_empty() {
        args.push(OsString::from("station-convert"));
    }
    args.insert(1, OsString::from("convert"));
    if let Err(err) = station_units::cli::run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
