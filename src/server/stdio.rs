//! Newline-delimited JSON-RPC sessions, over stdio or a TCP connection.
//!
//! Each request runs in its own task so slow upstream calls do not block the session. All
//! responses funnel through one writer task, which keeps lines from interleaving.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, Id};
use tracing::{debug, error, info};

use crate::server::mcp::{parse_request, JsonRpcResponse, McpServer};

const CANCELLED: &str = "notifications/cancelled";

type InFlight = Arc<Mutex<HashMap<String, AbortHandle>>>;

/// Serve one session on the process's stdin and stdout.
pub async fn serve_stdio(server: Arc<McpServer>) -> eyre::Result<()> {
    info!("MCP server reading JSON-RPC from stdin");
    serve_lines(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve one session until `reader` reaches EOF, then wait for outstanding responses.
pub async fn serve_lines<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> eyre::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(rx, writer));
    let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request = match parse_request(trimmed) {
            Ok(request) => request,
            Err(response) => {
                error!("Failed to parse JSON-RPC request: {:?}", response.error);
                if tx.send(response).is_err() {
                    break;
                }
                continue;
            }
        };

        if request.method == CANCELLED {
            if let Some(id) = request.params.get("requestId") {
                cancel(&in_flight, id);
            }
            continue;
        }

        info!("Received request: {} (id: {:?})", request.method, request.id);

        let key = request.id.as_ref().map(request_key);
        let server = Arc::clone(&server);
        let tx = tx.clone();
        let task_in_flight = Arc::clone(&in_flight);
        let task_key = key.clone();

        // Registered under the lock so a fast task cannot finish before its handle is stored.
        {
            let mut table = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let handle = tokio::spawn(async move {
                if let Some(response) = server.handle_request(request).await {
                    let _ = tx.send(response);
                }
                if let Some(key) = task_key {
                    finish(&task_in_flight, &key, tokio::task::id());
                }
            });
            if let Some(key) = key {
                table.insert(key, handle.abort_handle());
            }
        }
    }

    debug!("Input closed, draining in-flight requests");
    drop(tx);
    writer_task.await?
}

fn request_key(id: &Value) -> String {
    id.to_string()
}

fn cancel(in_flight: &InFlight, id: &Value) {
    let handle = in_flight
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&request_key(id));

    match handle {
        Some(handle) => {
            handle.abort();
            info!("Cancelled request {}", id);
        }
        None => debug!("Cancellation for unknown or finished request {}", id),
    }
}

// A reused request id overwrites the earlier entry, so only the task that owns the entry
// may remove it.
fn finish(in_flight: &InFlight, key: &str, task: Id) {
    let mut table = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    if table.get(key).is_some_and(|handle| handle.id() == task) {
        table.remove(key);
    }
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> eyre::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt};

    fn server(base: &str) -> Arc<McpServer> {
        Arc::new(McpServer::new(&Config::from_url(base.to_string())).unwrap())
    }

    async fn read_response<R: tokio::io::AsyncBufRead + Unpin>(
        lines: &mut tokio::io::Lines<R>,
    ) -> Value {
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_session_skips_notifications_and_reports_parse_errors() {
        let (client, session) = duplex(64 * 1024);
        let (session_read, session_write) = tokio::io::split(session);
        let handle = tokio::spawn(serve_lines(
            server("http://127.0.0.1:1"),
            session_read,
            session_write,
        ));

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write
            .write_all(
                concat!(
                    r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                    "\n",
                    "\n",
                    "garbage\n",
                )
                .as_bytes(),
            )
            .await
            .unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let response = read_response(&mut lines).await;
        assert_eq!(response["error"]["code"], json!(-32700));
        assert_eq!(response["id"], Value::Null);

        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":\"p\"}\n")
            .await
            .unwrap();
        let response = read_response(&mut lines).await;
        assert_eq!(response["id"], json!("p"));
        assert_eq!(response["result"], json!({}));

        client_write.shutdown().await.unwrap();
        drop(client_write);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_requests_answered_by_id() {
        let mut server_mock = mockito::Server::new_async().await;
        for epoch in 0..5u64 {
            server_mock
                .mock("GET", format!("/epoch/{}", epoch).as_str())
                .with_status(200)
                .with_body(
                    json!({"timestamp": 1000 + epoch, "blocknumber": epoch, "epochEnd": epoch})
                        .to_string(),
                )
                .create_async()
                .await;
        }

        let (client, session) = duplex(64 * 1024);
        let (session_read, session_write) = tokio::io::split(session);
        let handle = tokio::spawn(serve_lines(
            server(&server_mock.url()),
            session_read,
            session_write,
        ));

        let (client_read, mut client_write) = tokio::io::split(client);
        for epoch in 0..5u64 {
            let line = json!({
                "jsonrpc": "2.0",
                "id": epoch,
                "method": "tools/call",
                "params": {"name": "get_epoch_info", "arguments": {"epoch_id": epoch}}
            });
            client_write
                .write_all(format!("{}\n", line).as_bytes())
                .await
                .unwrap();
        }
        client_write.shutdown().await.unwrap();
        drop(client_write);

        let mut lines = BufReader::new(client_read).lines();
        let mut seen = Vec::new();
        for _ in 0..5 {
            let response = read_response(&mut lines).await;
            let id = response["id"].as_u64().unwrap();
            let result = &response["result"]["structuredContent"];
            assert_eq!(result["timestamp"], json!(1000 + id));
            seen.push(id);
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_suppresses_response() {
        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let task = tokio::spawn(std::future::pending::<()>());
        in_flight
            .lock()
            .unwrap()
            .insert(request_key(&json!(9)), task.abort_handle());

        cancel(&in_flight, &json!(9));

        assert!(task.await.unwrap_err().is_cancelled());
        assert!(in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reused_id_keeps_latest_request_cancellable() {
        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let key = request_key(&json!(7));

        let earlier = tokio::spawn(async { tokio::task::id() });
        let latest = tokio::spawn(std::future::pending::<()>());
        in_flight
            .lock()
            .unwrap()
            .insert(key.clone(), latest.abort_handle());

        let earlier_id = earlier.await.unwrap();
        finish(&in_flight, &key, earlier_id);
        assert!(in_flight.lock().unwrap().contains_key(&key));

        cancel(&in_flight, &json!(7));
        assert!(latest.await.unwrap_err().is_cancelled());
        assert!(in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finished_request_removes_own_entry() {
        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let key = request_key(&json!("a"));
        let task = tokio::spawn(std::future::pending::<()>());
        in_flight
            .lock()
            .unwrap()
            .insert(key.clone(), task.abort_handle());

        finish(&in_flight, &key, task.id());
        assert!(in_flight.lock().unwrap().is_empty());
        task.abort();
    }
}
