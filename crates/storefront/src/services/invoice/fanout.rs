//! Chunked fan-out of a rendered document to multiple sinks.
//!
//! The invoice PDF is rendered once and then fed, chunk by chunk, to every
//! sink that wants it (the HTTP response and the archive file). Sinks are
//! isolated: a sink that stops reading - a client that disconnects
//! mid-download, say - is dropped from the fan-out while the remaining
//! sinks receive the full document.

use std::path::Path;

use axum::body::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Channel capacity per sink, in chunks.
const SINK_BUFFER: usize = 16;

/// Split `data` into chunks and feed every chunk to `SINKS` receivers.
///
/// A background task owns the senders; it finishes when the document is
/// fully delivered or every receiver has been dropped. Slow sinks apply
/// backpressure through the bounded channels, while closed sinks are
/// skipped without affecting the others.
pub fn fan_out<const SINKS: usize>(
    data: Bytes,
    chunk_size: usize,
) -> [mpsc::Receiver<Bytes>; SINKS] {
    let chunk_size = chunk_size.max(1);

    let mut senders: Vec<Option<mpsc::Sender<Bytes>>> = Vec::with_capacity(SINKS);
    let receivers = std::array::from_fn(|_| {
        let (tx, rx) = mpsc::channel::<Bytes>(SINK_BUFFER);
        senders.push(Some(tx));
        rx
    });

    tokio::spawn(async move {
        let mut offset = 0;
        while offset < data.len() {
            let end = usize::min(offset + chunk_size, data.len());
            let chunk = data.slice(offset..end);
            offset = end;

            let mut any_open = false;
            for slot in &mut senders {
                if let Some(sender) = slot {
                    if sender.send(chunk.clone()).await.is_ok() {
                        any_open = true;
                    } else {
                        // Receiver gone; stop feeding this sink.
                        *slot = None;
                    }
                }
            }

            if !any_open {
                break;
            }
        }
    });

    receivers
}

/// Drain a fan-out sink into a file.
///
/// Failures are logged, not propagated: archival is best-effort and must
/// never disturb the sibling sink streaming the response.
pub async fn write_file(path: std::path::PathBuf, mut rx: mpsc::Receiver<Bytes>) {
    if let Err(e) = try_write_file(&path, &mut rx).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "invoice archival failed"
        );
    }
}

async fn try_write_file(path: &Path, rx: &mut mpsc::Receiver<Bytes>) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;

    while let Some(chunk) = rx.recv().await {
        file.write_all(&chunk).await?;
    }

    file.flush().await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn collect(mut rx: mpsc::Receiver<Bytes>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = rx.recv().await {
            out.extend_from_slice(&chunk);
        }
        out
    }

    #[tokio::test]
    async fn every_sink_receives_the_full_document() {
        let data = Bytes::from(vec![7u8; 1000]);

        let [a, b, c] = fan_out(data.clone(), 64);

        let (a, b, c) = tokio::join!(collect(a), collect(b), collect(c));

        assert_eq!(a, data);
        assert_eq!(b, data);
        assert_eq!(c, data);
    }

    #[tokio::test]
    async fn chunks_respect_the_requested_size() {
        let data = Bytes::from(vec![1u8; 100]);

        let [mut rx] = fan_out(data, 30);

        let mut sizes = Vec::new();
        while let Some(chunk) = rx.recv().await {
            sizes.push(chunk.len());
        }

        assert_eq!(sizes, vec![30, 30, 30, 10]);
    }

    #[tokio::test]
    async fn dropped_sink_does_not_starve_the_others() {
        // Document is much larger than one sink's buffer, so the fan-out
        // cannot complete unless the dropped sink is detected and skipped.
        let data = Bytes::from(vec![42u8; 64 * 1024]);

        let [dropped, survivor] = fan_out(data.clone(), 512);
        drop(dropped);

        let received = collect(survivor).await;

        assert_eq!(received, data);
    }

    #[tokio::test]
    async fn empty_document_closes_all_sinks() {
        let [mut a, mut b] = fan_out(Bytes::new(), 512);

        assert!(a.recv().await.is_none());
        assert!(b.recv().await.is_none());
    }

    #[tokio::test]
    async fn write_file_archives_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice-1.pdf");
        let data = Bytes::from_static(b"%PDF-1.4 pretend");

        let [rx] = fan_out(data.clone(), 4);
        write_file(path.clone(), rx).await;

        assert_eq!(std::fs::read(&path).unwrap(), data);
    }
}
