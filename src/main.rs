use clap::Parser;
use dirserve::{logger, server, Cli, Settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Help, version and malformed flags exit here, before anything is bound
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    logger::init(&settings.log)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = settings.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(server::run(settings))?;
    Ok(())
}
