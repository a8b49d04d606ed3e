use merge_cidades::{run, MergeConfig};
use std::{env, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) parse args ───────────────────────────────────────────────
    let cfg = match MergeConfig::from_args(env::args().skip(1)) {
        Ok(cfg) => cfg,
        // prints usage or help and exits with clap's status
        Err(e) => e.exit(),
    };

    // ─── 3) merge ────────────────────────────────────────────────────
    match run(&cfg) {
        Ok(summary) => {
            println!("Detected target column mapping:");
            print!("{}", summary.targets);
            println!("Merged file saved to: {}", summary.output_file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            println!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
