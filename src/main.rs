fn main() {
    #[cfg(feature = "cli")]
    oxivarint::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxivarint: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
