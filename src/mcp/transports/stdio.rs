//! Stdio transport: newline-delimited JSON-RPC on stdin/stdout.
//!
//! Each inbound line is one message. Replies are written as one line each and
//! flushed immediately. Logging must not go to stdout while this runs.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::server::McpServer;

/// Serve until `reader` reaches end of input.
pub async fn serve<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut handled: u64 = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // Raw bytes: malformed frames get a parse-error reply, not an I/O error.
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        handled += 1;

        if let Some(reply) = server.handle_json(line) {
            let mut frame = serde_json::to_vec(&reply)?;
            frame.push(b'\n');
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }
    }

    tracing::info!(messages = handled, "stdio input closed");
    Ok(())
}

/// Serve on the process's stdin and stdout.
pub async fn serve_stdio(server: &McpServer) -> std::io::Result<()> {
    tracing::info!("serving MCP over stdio");
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::ledger::Ledger;
    use serde_json::Value;
    use std::sync::Arc;

    async fn run(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let server = McpServer::new(Arc::new(Ledger::new(LedgerConfig::new("shop"))));
        let mut output = Vec::new();
        serve(&server, BufReader::new(input), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_session_over_stdio() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"log_agent_activity","arguments":{"agent":"ui-agent","action":"started","task":"build form"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_memory_status","arguments":{}}}"#,
            "\n",
        );
        let replies = run(input).await;

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["result"]["structuredContent"]["agent"], "ui-agent");
        assert_eq!(replies[2]["result"]["structuredContent"]["totalActivities"], 1);
    }

    #[tokio::test]
    async fn test_garbage_line_gets_parse_error_and_loop_continues() {
        let input = "oops\n{\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"ping\"}\n";
        let replies = run(input).await;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[1]["id"], 5);
        assert!(replies[1]["result"].is_object());
    }

    #[tokio::test]
    async fn test_non_utf8_line_does_not_end_session() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}");

        let replies = run_bytes(&input).await;
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["error"]["code"], -32700);
        assert_eq!(replies[2]["id"], 2);
    }
}
