mod config;
mod demo;
mod events;
mod server;

use anyhow::Result;
use clap::Parser;

use config::ServerConfig;
use server::UiServer;

#[derive(Parser)]
#[command(name = "vellum-server")]
#[command(about = "Authoritative server for vellum UI screens")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = vellum::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 32)]
    max_connections: usize,

    #[arg(long, default_value_t = 256, help = "Frames queued per connection")]
    outbound_queue: usize,

    #[arg(long, help = "Do not open the demo screens when a client joins")]
    no_demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = ServerConfig {
        max_connections: args.max_connections,
        outbound_queue: args.outbound_queue.max(1),
        demo_screen_on_join: !args.no_demo,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut server = UiServer::bind(&bind_addr, config).await?;
        log::info!("Server started on {}", server.local_addr()?);
        server.run().await?;
        log::info!("Server shutting down");
        Ok(())
    })
}
