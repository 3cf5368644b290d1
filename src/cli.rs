use clap::Parser;

/// Job gateway: validates job requests and forwards them to the upstream job API
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}
