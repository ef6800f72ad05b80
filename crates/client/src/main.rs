mod client;
mod config;

use clap::Parser;

use client::UiClient;
use config::ClientConfig;

#[derive(Parser)]
#[command(name = "vellum-client")]
#[command(about = "Headless vellum UI client")]
struct Args {
    #[arg(
        short,
        long,
        help = "Server address to connect to (e.g., 127.0.0.1:27015)"
    )]
    server: Option<String>,

    #[arg(short, long, default_value = "player")]
    name: String,

    #[arg(long, default_value_t = 64, help = "Frames queued towards the server")]
    outbound_queue: usize,

    #[arg(long, help = "Interact with every widget of the first modal screen")]
    interact: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = ClientConfig {
        name: args.name,
        outbound_queue: args.outbound_queue.max(1),
        interact: args.interact,
        ..Default::default()
    };
    if let Some(server_addr) = args.server {
        config.server_addr = server_addr;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut client = UiClient::connect(config).await?;
        client.run().await
    })
}
