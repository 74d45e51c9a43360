use anyhow::Result;
use chat_tabs::cli;

fn main() -> Result<()> {
    // Parse CLI arguments first so --log-level can configure logging
    let (command, options) = cli::parse();

    // Routes log records to the debug log file; mirrors to stderr when RUST_LOG is set
    chat_tabs::debug::init_log_bridge(options.log_level);

    log::info!("Starting chat-tabs {}", chat_tabs::VERSION);

    let result = cli::run(command, &options);
    if let Err(ref e) = result {
        eprintln!("chat-tabs: error: {e:#}");
    }
    result
}
