//! Async driver: feeds requests, external mutation batches and the reconciliation
//! timer into one engine on the current task.

use core::future;
use std::time::Instant;

use dom::{DOMSubscriber as _, DOMUpdate};
use log::{debug, error, warn};
use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant as TokioInstant, sleep_until};

use crate::engine::OverlayEngine;
use crate::handler::RequestHandler as _;
use crate::protocol::{Request, Response};

/// A request paired with the channel its response goes back on.
pub type Envelope = (Request, oneshot::Sender<Response>);

/// Current time on tokio's clock, so paused-time tests drive the debounce.
fn now() -> Instant {
    TokioInstant::now().into_std()
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(TokioInstant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

/// Serve `engine` until the request channel closes, then hand it back.
///
/// Mutation batches are applied to the document in order; a record the document
/// rejects is logged and skipped. A closed mutation channel only stops that source.
pub async fn run(
    mut engine: OverlayEngine,
    mut requests: mpsc::Receiver<Envelope>,
    mut mutations: mpsc::Receiver<Vec<DOMUpdate>>,
) -> OverlayEngine {
    let mut mutations_open = true;
    engine.observe(now());
    loop {
        let deadline = engine.next_deadline();
        select! {
            received = requests.recv() => {
                let Some((request, reply)) = received else {
                    debug!("request channel closed, stopping");
                    break;
                };
                let response = engine.handle(request);
                engine.observe(now());
                if reply.send(response).is_err() {
                    debug!("requester went away before the response was sent");
                }
            }
            batch = mutations.recv(), if mutations_open => {
                let Some(batch) = batch else {
                    mutations_open = false;
                    continue;
                };
                for update in batch {
                    if let Err(err) = engine.apply_update(update) {
                        warn!("mutation record rejected: {err:#}");
                    }
                }
                engine.observe(now());
            }
            () = sleep_until_deadline(deadline) => {
                if let Err(err) = engine.poll(now()) {
                    error!("reconciliation failed: {err:#}");
                }
                engine.observe(now());
            }
        }
    }
    engine
}
