// Server loop module
// Accepts connections until a shutdown signal arrives

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` resolves.
///
/// Must run inside a `LocalSet`, since connections are served with
/// `spawn_local`. Returning does not wait for in-flight connections; their
/// tasks are cancelled when the caller drops the `LocalSet`.
pub async fn start_server_loop<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> io::Result<()>
where
    S: Future<Output = io::Result<&'static str>>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            signal = &mut shutdown => {
                let signal = signal?;
                logger::log_shutdown(signal);
                logger::log_info(&format!(
                    "[Shutdown] {} connection(s) still active",
                    active_connections.load(Ordering::SeqCst)
                ));
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::page::PageStore;
    use crate::render::{Renderer, View};
    use crate::server::bind_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from("does/not/exist/wiki-config").unwrap();
        config.logging.access_log = false;
        let renderer = Renderer::from_sources([
            (View::View, "<h1>{{ title }}</h1>{{ body }}"),
            (View::Edit, "<h1>Editing {{ title }}</h1>"),
        ])
        .unwrap();
        let state = Arc::new(AppState::new(
            config,
            PageStore::new(dir.path(), "txt"),
            renderer,
        ));

        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    async move {
                        let _ = stop_rx.await;
                        Ok("test")
                    },
                ));

                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(b"GET /edit/Home HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                let mut raw = String::new();
                stream.read_to_string(&mut raw).await.unwrap();
                assert!(raw.starts_with("HTTP/1.1 200 OK"));
                assert!(raw.contains("<h1>Editing Home</h1>"));

                stop_tx.send(()).unwrap();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
