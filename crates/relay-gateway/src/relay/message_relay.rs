//! Submission pipeline: validate, persist, resolve reachability, fan out

use std::sync::Arc;

use relay_core::{DomainError, MessageStore, ResolvedMessage};
use tracing::instrument;

use super::RelayError;
use crate::connection::{ConnectionId, EventSink};
use crate::presence::PresenceRegistry;
use crate::protocol::{SendMessagePayload, ServerEvent};

/// Outcome of a successful submission
///
/// The message is persisted regardless of how many emits succeeded.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: ResolvedMessage,
    pub recipient_delivered: bool,
    pub sender_delivered: bool,
}

impl Delivery {
    /// Number of `receiveMessage` events handed to connections
    pub fn emitted(&self) -> usize {
        usize::from(self.recipient_delivered) + usize::from(self.sender_delivered)
    }
}

/// Relays submitted messages between connected users
pub struct MessageRelay {
    store: Arc<dyn MessageStore>,
    presence: Arc<PresenceRegistry>,
    sink: Arc<dyn EventSink>,
}

impl MessageRelay {
    pub fn new(
        store: Arc<dyn MessageStore>,
        presence: Arc<PresenceRegistry>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            presence,
            sink,
        }
    }

    /// Persist a submission and deliver it to the reachable parties
    ///
    /// The recipient is emitted to first, then the sender (echo to self). The
    /// two emits are independent and neither rolls back the persisted record.
    #[instrument(
        skip(self, submission),
        fields(sender = tracing::field::Empty, message_id = tracing::field::Empty)
    )]
    pub async fn submit(&self, submission: SendMessagePayload) -> Result<Delivery, RelayError> {
        let sender = submission
            .declared_sender()
            .cloned()
            .ok_or(RelayError::MissingSender)?;
        tracing::Span::current().record("sender", tracing::field::display(&sender));

        let new_message = submission.into_new_message(sender);
        let id = self.store.create(&new_message).await?;
        tracing::Span::current().record("message_id", tracing::field::display(id));

        let message = self
            .store
            .find_resolved_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound(id))?;

        let unresolved = std::iter::once(&message.sender)
            .chain(message.recipient.as_ref())
            .filter(|party| party.is_unresolved());
        for party in unresolved {
            tracing::debug!(user_id = %party.id, "Party has no stored profile; relaying id only");
        }

        // Point-in-time snapshot; a party may disconnect right after
        let recipient_connection = new_message
            .recipient
            .as_ref()
            .and_then(|recipient| self.presence.lookup(recipient));
        let sender_connection = self.presence.lookup(&new_message.sender);

        let recipient_delivered = match recipient_connection {
            Some(connection) => self.deliver(connection, &message).await,
            None => false,
        };
        let sender_delivered = match sender_connection {
            Some(connection) => self.deliver(connection, &message).await,
            None => false,
        };

        let delivery = Delivery {
            message,
            recipient_delivered,
            sender_delivered,
        };

        tracing::debug!(
            emitted = delivery.emitted(),
            recipient_delivered,
            sender_delivered,
            "Message relayed"
        );

        Ok(delivery)
    }

    async fn deliver(&self, connection: ConnectionId, message: &ResolvedMessage) -> bool {
        match self
            .sink
            .emit(connection, ServerEvent::ReceiveMessage(message.clone()))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection,
                    message_id = %message.id,
                    error = %e,
                    "Failed to emit message"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for MessageRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRelay")
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}
