use anyhow::Context;
use clap::Parser;
use gridpng::{GridServer, ServerConfig};
use log::info;

/// Serve a form that turns a JSON color grid into a PNG download.
#[derive(Parser, Debug)]
#[command(name = "gridpng", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ServerConfig {
        bind: cli.bind,
        workers: cli.workers.unwrap_or_else(num_cpus::get).max(1),
        ..Default::default()
    };

    let server = GridServer::bind(config.clone()).with_context(|| format!("binding {}", config.bind))?;
    if let Some(addr) = server.local_addr() {
        info!("listening on http://{}", addr);
    }
    server.run().context("server stopped")?;
    Ok(())
}
