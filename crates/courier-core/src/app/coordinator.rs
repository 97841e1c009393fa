//! Dispatch coordinator: pulls raw messages from the inbound source and
//! drives each one through validate -> resolve -> execute -> record.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{GatewayCounts, GatewayMetrics};
use crate::config::{GatewayConfig, RouteSpec};
use crate::domain::{
    DispatchState, Envelope, GatewayError, MessageId, Outcome, RawMessage, RejectReason,
};
use crate::exec::{HandlerDisposition, HandlerExecutor, HandlerRegistry, RetryPolicy};
use crate::impls;
use crate::ports::{InboundSource, OutcomeSink, SystemClock, UlidGenerator};
use crate::routing::{RouteEntry, RouteHandle, RouteTable};
use crate::validate::Validator;

/// The top-level dispatch loop.
///
/// A fixed-size worker pool draws envelopes from a bounded admission queue;
/// each slot runs one envelope through the full pipeline synchronously
/// relative to itself, concurrently with the other slots. Every admitted
/// message ends in exactly one terminal outcome record, shutdown included.
pub struct Gateway {
    routes: RouteHandle,
    registry: Arc<HandlerRegistry>,
    validator: Validator,
    executor: HandlerExecutor,
    sink: Arc<dyn OutcomeSink>,
    metrics: GatewayMetrics,

    /// Ids currently being dispatched; the same id is never in two slots.
    in_flight: Mutex<HashSet<MessageId>>,

    inbound_queue_capacity: usize,
    worker_pool_size: usize,
    sink_record_attempts: u32,
    sink_backoff: RetryPolicy,

    shutdown_tx: watch::Sender<bool>,
}

impl Gateway {
    /// Wire a gateway from parsed configuration, a registry, and a sink.
    ///
    /// Fails fast: the configuration is sanity-checked, the route table is
    /// built once, and every handler a route references must already be
    /// registered.
    pub fn new(
        config: GatewayConfig,
        registry: HandlerRegistry,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Arc<Self>, GatewayError> {
        config.validate()?;
        let table = RouteTable::from_specs(&config.routes)?;
        registry.verify_routes(&table)?;

        let registry = Arc::new(registry);
        let policy = RetryPolicy::from_config(&config);
        let validator = Validator::new(
            config.max_payload_bytes,
            Arc::new(UlidGenerator::new(SystemClock)),
            Arc::new(SystemClock),
        );
        let executor = HandlerExecutor::new(
            Arc::clone(&registry),
            policy.clone(),
            Duration::from_millis(config.handler_timeout_ms),
            config.max_attempts,
        );
        let (shutdown_tx, _) = watch::channel(false);

        info!(
            routes = table.len(),
            handlers = registry.len(),
            workers = config.worker_pool_size,
            "gateway wired"
        );

        Ok(Arc::new(Self {
            routes: RouteHandle::new(table),
            registry,
            validator,
            executor,
            sink,
            metrics: GatewayMetrics::new(),
            in_flight: Mutex::new(HashSet::new()),
            inbound_queue_capacity: config.inbound_queue_capacity,
            worker_pool_size: config.worker_pool_size,
            sink_record_attempts: config.sink_record_attempts,
            sink_backoff: policy,
            shutdown_tx,
        }))
    }

    /// Replace the active route table with one built from `specs`.
    ///
    /// Builds and verifies the new table first, then swaps atomically;
    /// in-flight dispatches keep the snapshot they started with.
    pub fn reload_routes(&self, specs: &[RouteSpec]) -> Result<(), GatewayError> {
        let table = RouteTable::from_specs(specs)?;
        self.registry.verify_routes(&table)?;
        info!(routes = table.len(), "route table reloaded");
        self.routes.swap(table);
        Ok(())
    }

    /// Stop admitting new messages. Already-admitted work finishes or
    /// cancels at its next suspension point; [`run`] then returns.
    ///
    /// [`run`]: Gateway::run
    pub fn shutdown(&self) {
        // receiver が全部落ちていても気にしない
        let _ = self.shutdown_tx.send(true);
    }

    pub fn counts(&self) -> GatewayCounts {
        self.metrics.snapshot()
    }

    /// Drive the gateway until the source ends or [`shutdown`] is called.
    ///
    /// [`shutdown`]: Gateway::shutdown
    pub async fn run(self: Arc<Self>, source: impl InboundSource + 'static) {
        let (tx, rx) = mpsc::channel::<RawMessage>(self.inbound_queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let pump = Self::spawn_pump(source, tx, self.shutdown_tx.subscribe());

        let mut workers = Vec::with_capacity(self.worker_pool_size);
        for worker_id in 0..self.worker_pool_size {
            let gateway = Arc::clone(&self);
            let rx = Arc::clone(&rx);
            let shutdown_rx = self.shutdown_tx.subscribe();
            workers.push(tokio::spawn(async move {
                gateway.worker_loop(worker_id, rx, shutdown_rx).await;
            }));
        }

        let _ = pump.await;
        for worker in workers {
            let _ = worker.await;
        }
        info!(counts = ?self.counts(), "gateway drained and stopped");
    }

    /// Pump task: inbound source -> bounded admission queue.
    ///
    /// A full queue blocks the `send`, which is the backpressure contract:
    /// admission never drops, the source has to wait.
    fn spawn_pump(
        mut source: impl InboundSource + 'static,
        tx: mpsc::Sender<RawMessage>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                // 取り込み待ちは shutdown と競合させる
                let raw = tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!("pump stopping: shutdown requested");
                            break;
                        }
                        continue;
                    }
                    raw = source.next() => raw,
                };

                let Some(raw) = raw else {
                    debug!("pump stopping: inbound source ended");
                    break;
                };

                if tx.send(raw).await.is_err() {
                    break;
                }
            }
            // tx drop でワーカー側の drain が始まる
        })
    }

    async fn worker_loop(
        &self,
        worker_id: usize,
        rx: Arc<Mutex<mpsc::Receiver<RawMessage>>>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            let raw = {
                let mut guard = rx.lock().await;
                guard.recv().await
            };
            let Some(raw) = raw else {
                debug!(worker_id, "worker stopping: queue drained");
                break;
            };
            self.process_one(raw, &mut shutdown_rx).await;
        }
    }

    /// One envelope, start to terminal outcome. The per-envelope state is
    /// threaded through [`DispatchState::advance`], which asserts every
    /// transition is legal.
    async fn process_one(&self, raw: RawMessage, shutdown_rx: &mut watch::Receiver<bool>) {
        self.metrics.mark_received();
        let state = DispatchState::Received.advance(DispatchState::Validating);
        debug!(state = ?state, id = ?raw.id, "processing raw message");

        let envelope = match self.validator.validate(&raw) {
            Ok(envelope) => envelope,
            Err(rejection) => {
                let state = state.advance(DispatchState::Rejected);
                debug!(state = ?state, message_id = %rejection.id, reason = %rejection.reason, "validation refused message");
                self.metrics.mark_rejected();
                self.record_outcome(&rejection.id, Outcome::rejected(&rejection.reason))
                    .await;
                return;
            }
        };

        // Same-id dedup: the second copy is rejected, not queued behind the
        // first, so the uniqueness invariant is visible to the sender.
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(envelope.id().clone()) {
                drop(in_flight);
                let state = state.advance(DispatchState::Rejected);
                warn!(state = ?state, message_id = %envelope.id(), "duplicate id already in flight");
                self.metrics.mark_rejected();
                self.record_outcome(
                    envelope.id(),
                    Outcome::rejected(RejectReason::DuplicateInFlight),
                )
                .await;
                return;
            }
        }
        self.metrics.enter_flight();

        // The snapshot taken here serves the whole dispatch; a concurrent
        // reload cannot change the handler list mid-envelope.
        let state = state.advance(DispatchState::Routing);
        let snapshot = self.routes.snapshot();
        let (outcome, state) = match snapshot.resolve(envelope.message_type()) {
            Some(entry) => {
                let state = state.advance(DispatchState::Executing);
                debug!(state = ?state, message_id = %envelope.id(), handlers = entry.handlers().len(), "route resolved");
                (self.execute_route(&envelope, entry, shutdown_rx).await, state)
            }
            None => {
                // Operator-visible alert: an unrouted type is a config gap.
                warn!(
                    message_id = %envelope.id(),
                    message_type = %envelope.message_type(),
                    "no route configured for message type"
                );
                let outcome = Outcome::dead_lettered(
                    GatewayError::NoRouteFound(envelope.message_type().clone()).to_string(),
                    0,
                );
                (outcome, state)
            }
        };

        let state = match &outcome {
            Outcome::Delivered => {
                self.metrics.mark_delivered();
                state.advance(DispatchState::Delivered)
            }
            Outcome::DeadLettered { .. } => {
                self.metrics.mark_dead_lettered();
                state.advance(DispatchState::DeadLettered)
            }
            Outcome::Rejected { .. } => {
                self.metrics.mark_rejected();
                state.advance(DispatchState::Rejected)
            }
        };
        self.record_outcome(envelope.id(), outcome).await;
        debug!(state = ?state, message_id = %envelope.id(), "terminal outcome recorded");

        self.in_flight.lock().await.remove(envelope.id());
        self.metrics.leave_flight();
    }

    /// Invoke every handler on the route, in configured order.
    ///
    /// Handlers are independent consumers: one failing does not suppress
    /// the rest. Exclusive routes short-circuit on the first `Success`.
    async fn execute_route(
        &self,
        envelope: &Envelope,
        entry: &RouteEntry,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> Outcome {
        let mut any_delivered = false;
        let mut last_failure: Option<(String, u32)> = None;

        for handler_id in entry.handlers() {
            match self.executor.execute(envelope, handler_id, shutdown_rx).await {
                HandlerDisposition::Delivered { attempts } => {
                    debug!(message_id = %envelope.id(), handler = %handler_id, attempts, "handler accepted message");
                    any_delivered = true;
                    if entry.exclusive() {
                        break;
                    }
                }
                HandlerDisposition::Failed { reason, attempts } => {
                    last_failure = Some((reason, attempts));
                }
                HandlerDisposition::Cancelled { attempts } => {
                    last_failure = Some(("cancelled by shutdown".to_string(), attempts));
                }
            }
        }

        let delivered = if entry.exclusive() {
            any_delivered
        } else {
            last_failure.is_none()
        };

        if delivered {
            Outcome::delivered()
        } else {
            let (reason, attempts) =
                last_failure.unwrap_or_else(|| ("no handler delivered".to_string(), 0));
            Outcome::dead_lettered(reason, attempts)
        }
    }

    /// Write the terminal record, retrying independently of handler retries.
    ///
    /// Exhausting the small fixed attempt count escalates to an alert-level
    /// log instead of crashing the process.
    async fn record_outcome(&self, id: &MessageId, outcome: Outcome) {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.sink.record(id, &outcome).await {
                Ok(()) => return,
                Err(err) if attempts >= self.sink_record_attempts => {
                    error!(
                        message_id = %id,
                        %err,
                        attempts,
                        ?outcome,
                        "giving up on recording outcome"
                    );
                    return;
                }
                Err(err) => {
                    warn!(message_id = %id, %err, attempts, "outcome sink write failed, retrying");
                    tokio::time::sleep(self.sink_backoff.next_delay(attempts)).await;
                }
            }
        }
    }
}

/// Convenience wiring for tests and demos: gateway plus a channel source.
pub fn wired(
    config: GatewayConfig,
    registry: HandlerRegistry,
    sink: Arc<dyn OutcomeSink>,
) -> Result<(Arc<Gateway>, impls::SourceHandle, impls::ChannelSource), GatewayError> {
    let capacity = config.inbound_queue_capacity;
    let gateway = Gateway::new(config, registry, sink)?;
    let (handle, source) = impls::channel_source(capacity);
    Ok((gateway, handle, source))
}
