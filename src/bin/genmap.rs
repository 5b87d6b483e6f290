use anyhow::{Context, Result};
use clap::Parser;

use genmap::cli::args::CliArgs;
use genmap::cli::driver::Session;

fn main() -> Result<()> {
    // Initialize tracing if GENMAP_LOG or RUST_LOG is set.
    genmap::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let session = Session::load(&args.file, args.registry_config())?;
    let report = session.run(&args.command)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{report}");
    }
    Ok(())
}
