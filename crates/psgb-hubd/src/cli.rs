use clap::Parser;

#[derive(Parser)]
#[command(about = "A PubSubHubbub hub", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"))]
pub struct CliArgs {
    #[arg(short, long, help = "Use <file> as the location of the config file", required = false)]
    pub config: Option<String>,
}
