//! Request interception for a single page.
//!
//! The browser is launched with request interception enabled, so every
//! request pauses until the page's listener either fails or continues it.

use crate::actions::RequestFilter;
use crate::error::Result;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Listen for paused requests on `page` and resolve each through `filter`.
///
/// The returned task runs until the page closes or the task is aborted.
/// `blocked` counts aborted requests.
pub async fn spawn_request_filter(
    page: Page,
    filter: Arc<dyn RequestFilter>,
    blocked: Arc<AtomicUsize>,
) -> Result<JoinHandle<()>> {
    let mut paused = page.event_listener::<EventRequestPaused>().await?;

    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let url = &event.request.url;
            let outcome = if filter.should_block(url) {
                blocked.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%url, "aborting consent-platform request");
                page.execute(FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            };

            // Fails when the page navigated away or closed mid-request
            if let Err(e) = outcome {
                tracing::trace!(%url, error = %e, "could not resolve paused request");
            }
        }
    }))
}
