use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::Command;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::session::Session;
use crate::store::Store;
use crate::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database path; `:memory:` keeps everything in RAM.
    pub file: String,
    /// When set, every connection must AUTH before any other command.
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 6379,
            file: ":memory:".to_string(),
            password: None,
        }
    }
}

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let store = Store::open(&config.file)?;
    store.start_reaper();

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        let password = config.password.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, password).await {
                error!("connection error: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, password),
    fields(client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    password: Option<String>,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);
    let mut session = Session::new(store, password);

    tracing::Span::current().record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {:?}", frame);

        let (reply, close) = match Command::try_from(frame) {
            Ok(cmd) => {
                let quit = matches!(cmd, Command::Quit);
                // QUIT goes through the session like everything else, so the
                // auth gate applies to it too.
                let reply = session.apply(cmd).await?;
                let close = quit && !matches!(reply, Frame::Error(_));
                (reply, close)
            }
            // Unknown commands and bad arguments are per-command errors; the
            // connection stays up.
            Err(err) => (Frame::Error(format!("ERR {}", err)), false),
        };

        debug!("Sending response to client: {}", reply);
        conn.write_frame(&reply).await?;

        if close {
            break;
        }
    }

    // Dropping the session discards any buffered MULTI state and auth flag.
    info!("Connection closed");
    Ok(())
}
