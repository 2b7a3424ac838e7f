//! Session glue between push events and shared client state.

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::context::AppContext;
use crate::graphql::queries::subscriptions;
use crate::graphql::Tip;
use crate::storage::SessionStore;
use crate::subscription::{Subscription, SubscriptionClient, SubscriptionError, SubscriptionResult};

/// Keeps the context tip and the stored tip in step with `onTipChanged`.
///
/// Started on login, stopped on logout.
#[derive(Debug)]
pub struct TipSync {
    task: JoinHandle<SubscriptionResult<()>>,
    ctx: Arc<AppContext>,
    store: SessionStore,
}

impl TipSync {
    pub fn start(
        client: &SubscriptionClient,
        ctx: Arc<AppContext>,
        store: SessionStore,
    ) -> SubscriptionResult<Self> {
        let tips: Subscription<Tip> =
            client.subscribe(subscriptions::on_tip_changed(), subscriptions::ON_TIP_CHANGED)?;
        let task = tokio::spawn(follow_tips(tips, ctx.clone(), store.clone()));
        Ok(Self { task, ctx, store })
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Tear the subscription down and clear the tip everywhere.
    ///
    /// A stream error that already ended the task is returned here.
    pub async fn stop(self) -> SubscriptionResult<()> {
        let TipSync { task, ctx, store } = self;
        task.abort();
        let outcome = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(SubscriptionError::Task(e.to_string())),
        };
        ctx.set_tip(None);
        store.clear_tip()?;
        tracing::info!("Tip sync stopped");
        outcome
    }
}

async fn follow_tips(
    mut tips: Subscription<Tip>,
    ctx: Arc<AppContext>,
    store: SessionStore,
) -> SubscriptionResult<()> {
    while let Some(event) = tips.next().await {
        match event {
            Ok(tip) => {
                tracing::debug!(height = tip.height, hash = %tip.hash, "Tip changed");
                if let Err(e) = store.save_tip(&tip) {
                    tracing::warn!(error = %e, "Failed to persist tip");
                }
                ctx.set_tip(Some(tip));
            }
            Err(e) => {
                tracing::error!(error = %e, "Tip subscription failed");
                return Err(e);
            }
        }
    }
    tracing::info!("Tip subscription completed by server");
    Ok(())
}

/// Re-run `fetch` once for the current tip and then once per tip change.
///
/// Changes that land while a fetch is running collapse into one rerun. The
/// stream ends when the context is dropped.
pub fn refetch_on_tip<F, Fut, R>(ctx: &AppContext, fetch: F) -> impl Stream<Item = R>
where
    F: FnMut(Tip) -> Fut,
    Fut: Future<Output = R>,
{
    let mut rx = ctx.watch_tip();
    let current = rx.borrow_and_update().clone();
    stream::unfold((rx, fetch, current), |(mut rx, mut fetch, mut pending)| async move {
        loop {
            if let Some(tip) = pending.take() {
                let value = fetch(tip).await;
                return Some((value, (rx, fetch, None)));
            }
            rx.changed().await.ok()?;
            pending = rx.borrow_and_update().clone();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tip(height: u64) -> Tip {
        Tip { height, hash: format!("h{height}") }
    }

    #[tokio::test]
    async fn test_refetch_once_per_tip() {
        let ctx = AppContext::new();
        ctx.set_tip(Some(tip(1)));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let stream = refetch_on_tip(&ctx, move |tip| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { tip.height * 10 }
        });
        futures_util::pin_mut!(stream);

        assert_eq!(stream.next().await, Some(10));
        ctx.set_tip(Some(tip(2)));
        assert_eq!(stream.next().await, Some(20));

        // Coalesced: only the latest value is fetched.
        ctx.set_tip(Some(tip(3)));
        ctx.set_tip(Some(tip(4)));
        assert_eq!(stream.next().await, Some(40));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        drop(ctx);
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_refetch_skips_cleared_tip() {
        let ctx = AppContext::new();
        let stream = refetch_on_tip(&ctx, |tip| async move { tip.height });
        futures_util::pin_mut!(stream);

        ctx.set_tip(None);
        ctx.set_tip(Some(tip(7)));
        assert_eq!(stream.next().await, Some(7));
    }
}
