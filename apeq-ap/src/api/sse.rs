//! SSE event stream for remote listeners
//!
//! Connecting to GET /events registers a listener with the callback registry;
//! the registration lives exactly as long as the connection. Events emitted
//! before the connection are never replayed.

use crate::api::AppContext;
use crate::session::{CallbackRegistry, ListenerId};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

/// GET /events - subscribe to the playback event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (listener_id, rx) = ctx.registry.register();
    info!(
        "SSE listener {} connected, total listeners: {}",
        listener_id,
        ctx.registry.listener_count()
    );

    let events = UnboundedReceiverStream::new(rx).filter_map(|event| {
        Event::default()
            .event(event.event_name())
            .json_data(&event)
            .ok()
            .map(Ok::<_, Infallible>)
    });

    let stream = ListenerStream {
        inner: events,
        registry: ctx.registry.clone(),
        listener_id,
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

/// Stream wrapper that unregisters its listener when the client disconnects.
struct ListenerStream<S> {
    inner: S,
    registry: CallbackRegistry,
    listener_id: ListenerId,
}

impl<S: Stream + Unpin> Stream for ListenerStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl<S> Drop for ListenerStream<S> {
    fn drop(&mut self) {
        self.registry.unregister(self.listener_id);
        debug!("SSE listener {} disconnected", self.listener_id);
    }
}
