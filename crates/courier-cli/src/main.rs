use async_trait::async_trait;
use serde::Deserialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

use courier_core::app::wired;
use courier_core::config::{GatewayConfig, RouteSpec};
use courier_core::domain::{Envelope, HandlerId, HandlerResult, RawMessage};
use courier_core::exec::{Handler, HandlerRegistry};
use courier_core::impls::InMemorySink;
use courier_core::ports::OutcomeSink;

#[derive(Debug, Deserialize)]
struct OrderPayload {
    order: u64,
}

/// Decodes the typed payload, then fails retryably `n` times before
/// accepting. Shows the retry loop end to end.
struct EmailHandler {
    remaining_failures: AtomicU32,
}

impl EmailHandler {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl Handler for EmailHandler {
    async fn invoke(&self, envelope: &Envelope) -> HandlerResult {
        let p: OrderPayload = match serde_json::from_value(envelope.payload().clone()) {
            Ok(p) => p,
            Err(e) => return HandlerResult::fatal(format!("payload schema: {e}")),
        };

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return HandlerResult::retryable(format!("smtp unavailable (left={left})"));
        }

        println!("email sent for order {}", p.order);
        HandlerResult::success()
    }
}

/// Always succeeds; stands in for a second independent consumer.
struct AuditHandler;

#[async_trait]
impl Handler for AuditHandler {
    async fn invoke(&self, envelope: &Envelope) -> HandlerResult {
        println!(
            "audit: {} {} at {}",
            envelope.id(),
            envelope.message_type(),
            envelope.received_at()
        );
        HandlerResult::success()
    }
}

fn load_config() -> Result<GatewayConfig, String> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))?
        }
        None => GatewayConfig {
            // デモなので短い backoff にしておく
            backoff_base_ms: 50,
            backoff_cap_ms: 400,
            ..GatewayConfig::default()
        },
    };
    if config.routes.is_empty() {
        config.routes = vec![RouteSpec {
            message_type: "order.created".into(),
            handlers: vec!["emailHandler".into(), "auditHandler".into()],
            exclusive: false,
        }];
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) 設定を読む（引数に JSON ファイル、無ければデフォルト）
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::from(2);
        }
    };

    // (B) handler を登録して gateway を配線
    let mut registry = HandlerRegistry::new();
    let wiring = registry
        .register(HandlerId::new("emailHandler"), Arc::new(EmailHandler::new(2)))
        .and_then(|_| registry.register(HandlerId::new("auditHandler"), Arc::new(AuditHandler)));
    if let Err(e) = wiring {
        eprintln!("wiring error: {e}");
        return ExitCode::from(2);
    }

    let sink = Arc::new(InMemorySink::new());
    let (gateway, handle, source) =
        match wired(config, registry, Arc::clone(&sink) as Arc<dyn OutcomeSink>) {
            Ok(parts) => parts,
            Err(e) => {
                eprintln!("startup error: {e}");
                return ExitCode::from(2);
            }
        };

    let runner = tokio::spawn(Arc::clone(&gateway).run(source));

    // (C) デモ用のトラフィックを流す：正常、未ルート、壊れた payload
    let messages = [
        RawMessage::new("order.created", br#"{"order": 42}"#.to_vec()).with_id("m1"),
        RawMessage::new("unknown.type", b"{}".to_vec()).with_id("m2"),
        RawMessage::new("order.created", b"not json".to_vec()).with_id("m3"),
    ];
    for raw in messages {
        if let Err(e) = handle.push(raw).await {
            eprintln!("push failed: {e}");
            return ExitCode::from(1);
        }
    }

    // (D) 入力を閉じて drain を待つ
    drop(handle);
    if runner.await.is_err() {
        eprintln!("gateway task failed");
        return ExitCode::from(1);
    }

    for (id, outcome) in sink.recorded() {
        println!("outcome: {id} -> {outcome:?}");
    }
    info!(counts = ?gateway.counts(), "demo finished");
    ExitCode::SUCCESS
}
