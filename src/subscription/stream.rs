//! Typed subscription streams.

use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::graphql::types::field;
use crate::observability::metrics;
use crate::subscription::client::{Event, Routes};
use crate::subscription::protocol::ClientMessage;
use crate::subscription::{SubscriptionError, SubscriptionResult};

/// Events of one subscription, delivered in arrival order.
///
/// Dropping the stream (or calling [`Subscription::unsubscribe`]) sends
/// `complete` to the server.
pub struct Subscription<T> {
    id: String,
    field: String,
    events: mpsc::UnboundedReceiver<Event>,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    routes: Routes,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: String,
        field: &str,
        events: mpsc::UnboundedReceiver<Event>,
        outgoing: mpsc::UnboundedSender<ClientMessage>,
        routes: Routes,
    ) -> Self {
        Self {
            id,
            field: field.to_string(),
            events,
            outgoing,
            routes,
            finished: false,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {}
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Wait for the first event, then close the subscription.
    pub async fn once(mut self) -> SubscriptionResult<T> {
        match self.next().await {
            Some(event) => event,
            None => Err(SubscriptionError::Closed),
        }
    }
}

impl<T: DeserializeOwned> Stream for Subscription<T> {
    type Item = SubscriptionResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        let event = match this.events.poll_recv(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(event) => event,
        };
        let item = match event {
            Some(Event::Next(response)) => {
                metrics::record_subscription_event(&this.field);
                response
                    .into_data()
                    .map_err(|e| SubscriptionError::Server(e.to_string()))
                    .and_then(|data| {
                        field::<T>(&data, &this.field)
                            .map_err(|e| SubscriptionError::Decode(e.to_string()))?
                            .ok_or_else(|| {
                                SubscriptionError::Decode(format!("event without '{}'", this.field))
                            })
                    })
            }
            Some(Event::Error(message)) => {
                this.finished = true;
                Err(SubscriptionError::Server(message))
            }
            Some(Event::Closed) => {
                this.finished = true;
                Err(SubscriptionError::Closed)
            }
            Some(Event::Complete) | None => {
                this.finished = true;
                return Poll::Ready(None);
            }
        };
        Poll::Ready(Some(item))
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if self.routes.remove(&self.id).is_some() {
            let _ = self.outgoing.send(ClientMessage::Complete {
                id: self.id.clone(),
            });
            tracing::debug!(id = %self.id, "Unsubscribed");
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("field", &self.field)
            .field("finished", &self.finished)
            .finish()
    }
}
