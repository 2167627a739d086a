//! ABOUTME: Local static content server for the harness page and media files
//! ABOUTME: Serves a directory over plain HTTP on a fire-and-forget thread

use actix_files::Files;
use actix_web::{App, HttpServer};
use lb_core::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info};

/// Configuration for the content server
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind; 0 picks an ephemeral port
    pub port: u16,
    /// Directory served at the root path
    pub root: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            root: PathBuf::from("."),
        }
    }
}

/// Handle to a running content server.
///
/// The server thread is detached; it dies with the process, which is all the
/// lifetime management a single measurement run needs.
#[derive(Debug, Clone)]
pub struct ContentServer {
    addr: SocketAddr,
}

impl ContentServer {
    /// Address the server actually bound (resolves port 0)
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Root URL the browser should navigate under, without trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start serving `config.root` in a background thread and report the bound
/// address. Fails if the requested port is already taken.
pub fn start(config: &ServeConfig) -> Result<ContentServer> {
    let host = config.host.clone();
    let port = config.port;
    let root = config.root.clone();
    let (tx, rx) = mpsc::channel::<Result<SocketAddr>>();

    std::thread::Builder::new()
        .name("lb-serve".to_string())
        .spawn(move || {
            let system = actix_web::rt::System::new();
            system.block_on(async move {
                let serve_root = root.clone();
                let server = HttpServer::new(move || {
                    App::new().service(
                        Files::new("/", serve_root.clone())
                            .index_file("index.html")
                            .prefer_utf8(true),
                    )
                })
                .workers(1)
                .bind((host.as_str(), port));

                let server = match server {
                    Ok(server) => server,
                    Err(e) => {
                        let _ = tx.send(Err(Error::Io(e)));
                        return;
                    }
                };

                let addr = match server.addrs().first().copied() {
                    Some(addr) => addr,
                    None => {
                        let _ = tx.send(Err(Error::Config(
                            "content server bound no address".to_string(),
                        )));
                        return;
                    }
                };

                info!(%addr, root = %root.display(), "Content server listening");
                let _ = tx.send(Ok(addr));

                if let Err(e) = server.run().await {
                    error!(error = %e, "Content server exited");
                }
            });
        })
        .map_err(Error::Io)?;

    let addr = rx
        .recv_timeout(Duration::from_secs(10))
        .map_err(|_| Error::Config("content server did not start in time".to_string()))??;

    Ok(ContentServer { addr })
}
