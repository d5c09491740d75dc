use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortHandle, abortable};
use tokio::sync::mpsc;

use crate::common::{ChainContext, StatusEvent};
use crate::gateway::ContractGateway;

const UPDATE_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionMode {
    /// Keep polling for new logs until cancelled.
    Continuous,
    /// Fetch once, deliver, and end the stream.
    Once,
}

#[derive(Debug, Clone, Copy)]
pub struct SubscribeOptions {
    pub mode: SubscriptionMode,
    pub poll_interval: Duration,
    pub from_block: u64,
}

/// Pushed to the subscriber in emission order.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Batch(Vec<StatusEvent>),
    Failed(String),
}

/// Handle to a running status subscription. Dropping it stops the task.
#[derive(Debug)]
pub struct StatusSubscription {
    abort: AbortHandle,
}

impl StatusSubscription {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Starts streaming `StatusUpdated` events. The receiver closes when the
/// subscription is cancelled or a one-shot fetch has been delivered.
pub fn subscribe_status<G>(
    gateway: Arc<G>,
    ctx: ChainContext,
    options: SubscribeOptions,
) -> (StatusSubscription, mpsc::Receiver<StatusUpdate>)
where
    G: ContractGateway + ?Sized + 'static,
{
    let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);
    let (task, abort) = abortable(poll_status(gateway, ctx, options, update_tx));

    tokio::spawn(async move {
        if task.await.is_err() {
            log::debug!("Status subscription cancelled");
        }
    });

    (StatusSubscription { abort }, update_rx)
}

async fn poll_status<G>(
    gateway: Arc<G>,
    ctx: ChainContext,
    options: SubscribeOptions,
    update_tx: mpsc::Sender<StatusUpdate>,
) where
    G: ContractGateway + ?Sized,
{
    let mut next_block = options.from_block;
    let mut delivered_once = false;
    let mut ticker = tokio::time::interval(options.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (update, caught_up) = match gateway.fetch_status_events(&ctx, next_block).await {
            Ok(page) => {
                next_block = page.next_block;
                let update = if page.events.is_empty() && delivered_once {
                    None
                } else {
                    delivered_once = true;
                    Some(StatusUpdate::Batch(page.events))
                };
                (update, page.caught_up)
            }
            Err(err) => (Some(StatusUpdate::Failed(err.to_string())), true),
        };

        if let Some(update) = update {
            if update_tx.send(update).await.is_err() {
                log::debug!("Status subscriber went away");
                break;
            }
        }

        if !caught_up {
            // Older blocks remain; fetch the next window without waiting.
            ticker.reset_immediately();
            continue;
        }
        if options.mode == SubscriptionMode::Once {
            break;
        }
    }
}
