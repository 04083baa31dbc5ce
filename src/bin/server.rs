use clap::Parser;
use sqlitedis::server::{self, Config};
use sqlitedis::Error;

#[derive(Parser, Debug)]
struct Args {
    /// The address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// The port to listen on
    #[arg(short, long, default_value_t = 6379)]
    port: u16,

    /// SQLite database file backing the store
    #[arg(short, long, default_value = ":memory:")]
    file: String,

    /// Require clients to AUTH with this password
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(Config {
        host: args.host,
        port: args.port,
        file: args.file,
        password: args.password,
    })
    .await
}
