//! CLI entry point for overlapping wave function collapse generation

use clap::Parser;
use flexi_logger::Logger;
use overlapwfc::io::cli::{Cli, Runner};
use overlapwfc::io::error::invalid_parameter;

fn main() -> overlapwfc::Result<()> {
    let cli = Cli::parse();

    // The handle flushes buffered records when dropped, so it has to outlive the run
    let _logger = Logger::try_with_str(&cli.log)
        .and_then(flexi_logger::Logger::start)
        .map_err(|e| invalid_parameter("log", &cli.log, &e))?;

    Runner::new(cli).run()?;
    Ok(())
}
