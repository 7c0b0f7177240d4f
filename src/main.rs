fn main() {
    #[cfg(feature = "cli")]
    gpolyline::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("gpolyline: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
