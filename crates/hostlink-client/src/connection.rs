use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use hostlink_frame::{decode_frame, encode_frame, FrameConfig};

use crate::error::{ClientError, Result};
use crate::launcher::HostProcess;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// A live connection to a companion process.
///
/// One background task owns the companion's stdout and splits the byte
/// stream into frames; completed frames are handed to pending readers in
/// FIFO order, or buffered without bound until a reader registers. Nothing
/// is ever dropped for lack of a consumer.
pub struct Connection {
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    child: tokio::sync::Mutex<Option<Child>>,
    token: CancellationToken,
}

struct Shared {
    inner: Mutex<Inner>,
}

struct Inner {
    /// Completed frames not yet claimed by a reader. Append at the tail,
    /// deliver from the head.
    frames: VecDeque<Bytes>,
    /// Pending readers, oldest first. The Nth registered reader gets the
    /// Nth frame completed after it registered.
    readers: VecDeque<PendingReader>,
    open: bool,
    next_reader_id: u64,
}

struct PendingReader {
    id: u64,
    tx: oneshot::Sender<Result<Bytes>>,
}

enum Claim {
    /// A frame was already buffered; resolved without waiting.
    Frame(Bytes),
    /// No frame available; the caller waits on the channel.
    Wait(u64, oneshot::Receiver<Result<Bytes>>),
}

impl Connection {
    /// Bind a connection to a spawned companion process.
    pub fn from_process(process: HostProcess, config: FrameConfig) -> Self {
        Self::bind(process.stdout, process.stdin, Some(process.child), config)
    }

    /// Bind a connection to arbitrary byte streams.
    ///
    /// `reader` is the inbound stream (the companion's stdout); `writer`
    /// is the outbound sink (its stdin). Useful for loopbacks and
    /// pre-spawned processes.
    pub fn from_io(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self::bind(reader, writer, None, FrameConfig::default())
    }

    fn bind(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
        child: Option<Child>,
        config: FrameConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                frames: VecDeque::new(),
                readers: VecDeque::new(),
                open: true,
                next_reader_id: 0,
            }),
        });
        let token = CancellationToken::new();

        tokio::spawn(read_loop(reader, Arc::clone(&shared), token.clone(), config));

        Self {
            shared,
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            child: tokio::sync::Mutex::new(child),
            token,
        }
    }

    /// Serialize `value` to JSON and write it as one frame to the
    /// companion's stdin.
    ///
    /// Writes are serialized in call order; there is no retry on failure.
    pub async fn send<T: Serialize>(&self, value: &T) -> Result<()> {
        if !self.is_open() {
            return Err(ClientError::ConnectionClosed);
        }

        let payload = serde_json::to_vec(value).map_err(ClientError::Serialize)?;
        let mut buf = BytesMut::with_capacity(hostlink_frame::HEADER_SIZE + payload.len());
        encode_frame(&payload, &mut buf)?;

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&buf)
            .await
            .map_err(ClientError::WriteFailed)?;
        writer.flush().await.map_err(ClientError::WriteFailed)?;
        trace!(bytes = buf.len(), "frame sent");
        Ok(())
    }

    /// Receive the next frame, waiting as long as it takes.
    ///
    /// Resolves immediately if a complete frame is already buffered. Fails
    /// with `ConnectionClosed` once the connection is closed and every
    /// buffered frame has been drained.
    pub async fn receive(&self) -> Result<Value> {
        match self.shared.claim()? {
            Claim::Frame(frame) => parse_frame(frame),
            Claim::Wait(_, rx) => match rx.await {
                Ok(result) => parse_frame(result?),
                // Sender dropped without resolving; only possible if the
                // engine task was torn down with the runtime.
                Err(_) => Err(ClientError::ConnectionClosed),
            },
        }
    }

    /// Receive the next frame, failing with `Timeout` once `timeout` has
    /// elapsed.
    ///
    /// A timed-out call deregisters its reader and never consumes a frame:
    /// if a frame races the deadline, it is returned to the head of the
    /// buffered-frame queue for the next reader.
    pub async fn receive_timeout(&self, timeout: Duration) -> Result<Value> {
        let (id, mut rx) = match self.shared.claim()? {
            Claim::Frame(frame) => return parse_frame(frame),
            Claim::Wait(id, rx) => (id, rx),
        };

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(result)) => parse_frame(result?),
            Ok(Err(_)) => Err(ClientError::ConnectionClosed),
            Err(_elapsed) => {
                self.shared.deregister(id, &mut rx);
                Err(ClientError::Timeout(timeout))
            }
        }
    }

    /// Whether the connection is still `Open`.
    pub fn is_open(&self) -> bool {
        self.shared.lock().open
    }

    /// Terminate the companion process and close the connection.
    ///
    /// Idempotent: the first call kills the process exactly once and fails
    /// every pending reader with `ConnectionClosed`; later calls are no-ops.
    /// Frames already buffered remain receivable.
    pub async fn disconnect(&self) {
        self.token.cancel();

        if let Some(mut child) = self.child.lock().await.take() {
            debug!("terminating companion process");
            if let Err(err) = child.kill().await {
                warn!(error = %err, "failed to kill companion process");
            }
        }

        self.shared.close();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Stop the read task; the child (if any) is reaped by kill_on_drop.
        self.token.cancel();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("Connection")
            .field("open", &inner.open)
            .field("buffered_frames", &inner.frames.len())
            .field("pending_readers", &inner.readers.len())
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("connection state poisoned")
    }

    /// Claim a buffered frame or register as a pending reader.
    ///
    /// Dispatch and registration share one lock, so byte arrival and
    /// reader registration are serialized relative to each other.
    fn claim(&self) -> Result<Claim> {
        let mut inner = self.lock();

        if let Some(frame) = inner.frames.pop_front() {
            return Ok(Claim::Frame(frame));
        }
        if !inner.open {
            return Err(ClientError::ConnectionClosed);
        }

        let id = inner.next_reader_id;
        inner.next_reader_id += 1;
        let (tx, rx) = oneshot::channel();
        inner.readers.push_back(PendingReader { id, tx });
        Ok(Claim::Wait(id, rx))
    }

    /// Remove a timed-out reader.
    ///
    /// If the reader is no longer queued, a frame (or closure) raced the
    /// deadline and already resolved its channel. A frame recovered from
    /// the channel is handed to the oldest reader still pending; only when
    /// none remains does it go back to the head of the queue (it completed
    /// before anything buffered behind it).
    fn deregister(&self, id: u64, rx: &mut oneshot::Receiver<Result<Bytes>>) {
        let mut inner = self.lock();

        if let Some(pos) = inner.readers.iter().position(|reader| reader.id == id) {
            inner.readers.remove(pos);
            return;
        }

        let Ok(Ok(frame)) = rx.try_recv() else {
            return;
        };

        trace!("frame raced a timeout, redispatching");
        let mut undelivered = Ok(frame);
        while let Some(reader) = inner.readers.pop_front() {
            match reader.tx.send(undelivered) {
                Ok(()) => return,
                Err(rejected) => undelivered = rejected,
            }
        }

        if let Ok(frame) = undelivered {
            inner.frames.push_front(frame);
        }
    }

    /// Hand a completed frame to the oldest live reader, or buffer it.
    fn dispatch(&self, frame: Bytes) {
        let mut inner = self.lock();

        let mut undelivered = Ok(frame);
        while let Some(reader) = inner.readers.pop_front() {
            match reader.tx.send(undelivered) {
                Ok(()) => return,
                // Receiver dropped (cancelled future); try the next reader.
                Err(rejected) => undelivered = rejected,
            }
        }

        if let Ok(frame) = undelivered {
            inner.frames.push_back(frame);
        }
    }

    /// Transition to `Closed` and fail every pending reader.
    ///
    /// Buffered frames are kept: they completed before closure and remain
    /// deliverable to later `receive` calls.
    fn close(&self) {
        let mut inner = self.lock();
        if !inner.open {
            return;
        }
        inner.open = false;

        debug!(
            buffered_frames = inner.frames.len(),
            pending_readers = inner.readers.len(),
            "connection closed"
        );
        for reader in inner.readers.drain(..) {
            let _ = reader.tx.send(Err(ClientError::ConnectionClosed));
        }
    }
}

async fn read_loop(
    mut reader: impl AsyncRead + Send + Unpin + 'static,
    shared: Arc<Shared>,
    token: CancellationToken,
    config: FrameConfig,
) {
    let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                shared.close();
                return;
            }
            read = reader.read_buf(&mut buf) => match read {
                Ok(0) => {
                    debug!("companion stdout reached EOF");
                    shared.close();
                    return;
                }
                Ok(n) => {
                    trace!(bytes = n, "chunk received");
                    loop {
                        match decode_frame(&mut buf, config.max_payload_size) {
                            Ok(Some(frame)) => shared.dispatch(frame),
                            Ok(None) => break,
                            Err(err) => {
                                // A bad length prefix means the stream can
                                // never be re-synchronized.
                                warn!(error = %err, "fatal framing error");
                                shared.close();
                                return;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "read error from companion");
                    shared.close();
                    return;
                }
            }
        }
    }
}

fn parse_frame(frame: Bytes) -> Result<Value> {
    serde_json::from_slice(&frame).map_err(ClientError::MalformedFrame)
}
