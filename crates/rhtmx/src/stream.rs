// File: src/stream.rs
// Purpose: Two-phase document streaming: shell first, deferred sections after

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use maud::Markup;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

use crate::component::DeferredSection;
use crate::document::Document;

/// Body stream of a rendered document
///
/// Yields the shell, then each deferred section as it completes, then the
/// tail. Dropping the stream (the client went away) aborts the task that
/// drives the deferred sections.
pub struct RenderStream {
    shell: Option<Bytes>,
    sections: Option<ReceiverStream<Bytes>>,
    tail: Option<Bytes>,
    task: Option<AbortHandle>,
}

impl Stream for RenderStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(shell) = this.shell.take() {
            return Poll::Ready(Some(Ok(shell)));
        }

        if let Some(sections) = this.sections.as_mut() {
            match sections.poll_next_unpin(cx) {
                Poll::Ready(Some(chunk)) => return Poll::Ready(Some(Ok(chunk))),
                Poll::Ready(None) => this.sections = None,
                Poll::Pending => return Poll::Pending,
            }
        }

        Poll::Ready(this.tail.take().map(Ok))
    }
}

impl Drop for RenderStream {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Turns a [`Document`] into response bytes
pub struct StreamingRenderer;

impl StreamingRenderer {
    /// Streams a document; must be called inside a tokio runtime when the
    /// document has deferred sections
    pub fn stream(document: Document) -> RenderStream {
        let Document {
            shell,
            tail,
            deferred,
            bootstrap,
        } = document;

        let (sections, task) = if deferred.is_empty() {
            (None, None)
        } else {
            let (rx, task) = spawn_sections(bootstrap.pathname, deferred);
            (Some(ReceiverStream::new(rx)), Some(task))
        };

        RenderStream {
            shell: Some(Bytes::from(shell)),
            sections,
            tail: Some(Bytes::from(tail)),
            task,
        }
    }

    /// Renders a document to completion, waiting for every deferred section
    pub async fn render_to_string(document: Document) -> String {
        let mut out = String::new();
        let mut stream = Self::stream(document);
        while let Some(Ok(chunk)) = stream.next().await {
            out.push_str(&String::from_utf8_lossy(&chunk));
        }
        out
    }
}

fn spawn_sections(
    pathname: String,
    deferred: Vec<DeferredSection>,
) -> (mpsc::Receiver<Bytes>, AbortHandle) {
    let (tx, rx) = mpsc::channel(deferred.len());

    let handle = tokio::spawn(async move {
        let mut pending: FuturesUnordered<_> = deferred
            .into_iter()
            .map(|section| async move { (section.id, section.future.await) })
            .collect();

        loop {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Client left {} with sections pending, aborting render", pathname);
                    break;
                }
                next = pending.next() => match next {
                    Some((id, Ok(markup))) => {
                        if tx.send(Bytes::from(fill_chunk(&id, markup))).await.is_err() {
                            break;
                        }
                    }
                    Some((id, Err(err))) => {
                        error!("Deferred section {} of {} failed after shell: {:#}", id, pathname, err);
                    }
                    None => break,
                }
            }
        }
    });

    (rx, handle.abort_handle())
}

/// Template holding a finished section plus the script that swaps it in
fn fill_chunk(id: &str, markup: Markup) -> String {
    format!(
        concat!(
            r#"<template data-rhtmx-for="{id}">{body}</template>"#,
            r#"<script>(function(){{var t=document.querySelector('template[data-rhtmx-for="{id}"]'),"#,
            r#"p=document.getElementById("{id}");if(t&&p){{p.replaceWith(t.content);t.remove();}}}})();</script>"#
        ),
        id = id,
        body = markup.into_string()
    )
}
