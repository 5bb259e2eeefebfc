//! # Loopback Calculator
//!
//! Two engines wired back to back over in-process channels. The "server"
//! engine serves `add` and `divide`; the "client" engine calls them and
//! sends a notification.
//!
//! ```bash
//! RUST_LOG=turul_json_rpc_engine=debug cargo run --example loopback_calculator
//! ```

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{info, warn};
use turul_json_rpc_engine::prelude::*;

type Wire = mpsc::UnboundedSender<(String, bool)>;

fn wire_transport(wire: Wire) -> impl Transport {
    FunctionTransport::new(move |payload: String, is_request: bool| {
        let result = wire
            .send((payload, is_request))
            .map_err(|_| TransportError::Closed);
        async move { result }
    })
}

/// Feed every envelope from `inbox` into `engine`, one task per envelope
fn pump(engine: Arc<JsonRpcEngine>, mut inbox: mpsc::UnboundedReceiver<(String, bool)>) {
    tokio::spawn(async move {
        while let Some((text, is_request)) = inbox.recv().await {
            let engine = engine.clone();
            tokio::spawn(async move {
                if let Err(e) = engine.receive(&text, is_request).await {
                    warn!("{} could not process envelope: {}", engine.name().unwrap_or("?"), e);
                }
            });
        }
        // Peer hung up
        engine.set_error(Some(EngineError::disconnected("channel closed")));
    });
}

fn number(params: &[Value], index: usize) -> Result<f64, MethodError> {
    params
        .get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| RpcError::invalid_params(format!("argument {} must be a number", index)).into())
}

fn calculator() -> MethodRegistry {
    MethodRegistry::new()
        .with_fn("add", |params| async move {
            Ok(json!(number(&params, 0)? + number(&params, 1)?))
        })
        .with_fn("divide", |params| async move {
            let (a, b) = (number(&params, 0)?, number(&params, 1)?);
            if b == 0.0 {
                return Err(RpcError::server_error(
                    -32000,
                    "division by zero",
                    Some(json!({ "dividend": a })),
                )
                .into());
            }
            Ok(json!(a / b))
        })
        .with_fn("log", |params| async move {
            info!("server received log notification: {:?}", params);
            Ok(Value::Null)
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (client_tx, client_rx) = mpsc::unbounded_channel();
    let (server_tx, server_rx) = mpsc::unbounded_channel();

    let client = Arc::new(
        JsonRpcEngine::builder()
            .with_name("client")
            .with_transport(wire_transport(client_tx))
            .build(),
    );
    let server = Arc::new(
        JsonRpcEngine::builder()
            .with_name("server")
            .with_transport(wire_transport(server_tx))
            .with_resolver(calculator())
            .build(),
    );

    pump(server.clone(), client_rx);
    pump(client.clone(), server_rx);

    info!("server methods: {:?}", server.supported_methods());

    let sum: f64 = client.call_as("add", vec![json!(2), json!(3)]).await?;
    info!("add(2, 3) = {}", sum);

    let quotient: f64 = client.call_as("divide", vec![json!(9), json!(4)]).await?;
    info!("divide(9, 4) = {}", quotient);

    match client.call("divide", vec![json!(1), json!(0)]).await {
        Ok(value) => warn!("divide(1, 0) unexpectedly returned {}", value),
        Err(e) => info!("divide(1, 0) failed as expected: {}", e),
    }

    match client.call("subtract", vec![json!(5), json!(1)]).await {
        Ok(value) => warn!("subtract unexpectedly returned {}", value),
        Err(e) => info!("subtract failed as expected: {}", e),
    }

    client.notify("log", vec![json!("hello from the client")]).await?;

    // Give the notification a moment to be dispatched
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    info!("client statistics: {:?}", client.statistics());
    info!("server statistics: {:?}", server.statistics());

    client.set_error(Some(EngineError::disconnected("demo finished")));
    Ok(())
}
