use std::error::Error;
use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::mpsc;

use crate::common::{ChainContext, NetworkCommand, NetworkEvent, PeerSelection};
use crate::feed::chat;
use crate::feed::subscription::{
    StatusSubscription, StatusUpdate, SubscribeOptions, SubscriptionMode, subscribe_status,
};
use crate::gateway::ContractGateway;

/// Background task owning the gateway. Receives commands from the UI and
/// reports results back as events.
pub struct ContractClient<G: ContractGateway + 'static> {
    gateway: Arc<G>,
    ctx: ChainContext,
    expected_chain_id: u64,
    status_options: SubscribeOptions,
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    subscription: Option<(StatusSubscription, mpsc::Receiver<StatusUpdate>)>,
}

enum Next {
    Command(Option<NetworkCommand>),
    Status(Option<StatusUpdate>),
}

impl<G: ContractGateway + 'static> ContractClient<G> {
    pub fn new(
        gateway: Arc<G>,
        ctx: ChainContext,
        expected_chain_id: u64,
        status_options: SubscribeOptions,
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
    ) -> Self {
        Self {
            gateway,
            ctx,
            expected_chain_id,
            status_options,
            event_sender,
            command_receiver,
            subscription: None,
        }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        match self.gateway.chain_id().await {
            Ok(chain_id) => {
                if chain_id != self.expected_chain_id {
                    log::warn!(
                        "RPC endpoint reports chain {chain_id}, expected {}",
                        self.expected_chain_id
                    );
                }
                self.emit(NetworkEvent::ChainConnected(chain_id)).await;
            }
            Err(err) => log::warn!("Unable to query chain id: {err}"),
        }

        log::info!("Contract event loop started for {}", self.ctx.self_address);

        loop {
            let next = tokio::select! {
                command = self.command_receiver.recv() => Next::Command(command),
                update = next_status_update(&mut self.subscription) => Next::Status(update),
            };

            match next {
                Next::Command(Some(command)) => self.handle_command(command).await,
                Next::Command(None) => break,
                Next::Status(Some(update)) => self.handle_status_update(update).await,
                Next::Status(None) => {
                    log::debug!("Status stream ended");
                    self.subscription = None;
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::LoadHistory { peer } => self.load_history(peer).await,
            NetworkCommand::SendMessage { peer, body } => self.send_message(peer, body).await,
            NetworkCommand::SubscribeStatus => {
                // Replacing the tuple drops the previous handle, which stops it.
                let options = SubscribeOptions {
                    mode: SubscriptionMode::Continuous,
                    ..self.status_options
                };
                self.subscription = Some(subscribe_status(
                    Arc::clone(&self.gateway),
                    self.ctx,
                    options,
                ));
                log::info!("Subscribed to StatusUpdated on {}", self.ctx.status_contract);
            }
            NetworkCommand::UnsubscribeStatus => {
                if let Some((subscription, _)) = self.subscription.take() {
                    subscription.cancel();
                    log::info!("Status subscription torn down");
                }
            }
        }
    }

    async fn load_history(&mut self, peer: PeerSelection) {
        let state = chat::load_history(self.gateway.as_ref(), &self.ctx, &peer).await;
        self.emit(NetworkEvent::HistoryLoaded { peer, state }).await;
    }

    async fn send_message(&mut self, peer: Address, body: String) {
        let selection = PeerSelection::Peer(peer);
        let result = chat::write_message(self.gateway.as_ref(), &self.ctx, &selection, &body)
            .await
            .map_err(|err| err.to_string());
        let sent = result.is_ok();
        self.emit(NetworkEvent::MessageSent { peer, result }).await;

        if sent {
            self.load_history(selection).await;
        }
    }

    async fn handle_status_update(&mut self, update: StatusUpdate) {
        let event = match update {
            StatusUpdate::Batch(events) => NetworkEvent::StatusBatch(events),
            StatusUpdate::Failed(error) => NetworkEvent::StatusFailed(error),
        };
        self.emit(event).await;
    }

    async fn emit(&self, event: NetworkEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }
}

async fn next_status_update(
    subscription: &mut Option<(StatusSubscription, mpsc::Receiver<StatusUpdate>)>,
) -> Option<StatusUpdate> {
    match subscription {
        Some((_, updates)) => updates.recv().await,
        None => std::future::pending().await,
    }
}
