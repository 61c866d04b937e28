use clap::Parser;

#[derive(Parser)]
#[command(about = "A reference PubSubHubbub subscriber agent", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"))]
pub struct CliArgs {
    #[arg(long, help = "Hub base URL to subscribe against", default_value = "http://localhost:8080")]
    pub hub_url: String,
    #[arg(long, help = "This agent's own externally-reachable base URL", default_value = "http://localhost:8081")]
    pub self_url: String,
    #[arg(long, help = "Host:port to listen on", default_value = "127.0.0.1:8081")]
    pub listen: String,
}
