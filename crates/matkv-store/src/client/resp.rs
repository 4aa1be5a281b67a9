//! Pipelined RESP client
//!
//! One TCP connection, two tasks. Committed pipelines go through a channel to
//! the writer task, which registers their reply slots and then writes the
//! bytes. The reader task parses replies and hands each one to the oldest
//! registered slot, so replies resolve strictly in submission order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::frame::{encode_command, Frame};
use super::{ClientError, ClientResult, KvClient, PendingReply};
use crate::config::ClientConfig;

type ReplySlot = Box<dyn FnOnce(ClientResult<Frame>) + Send>;

/// Commands committed together
struct Pipeline {
    payload: Bytes,
    slots: Vec<ReplySlot>,
}

/// Commands waiting for the next commit
#[derive(Default)]
struct Queue {
    buf: BytesMut,
    slots: Vec<ReplySlot>,
}

/// State shared with the connection tasks
#[derive(Default)]
struct Shared {
    inflight: Mutex<VecDeque<ReplySlot>>,
    closed: AtomicBool,
}

impl Shared {
    fn fail_all(&self, reason: &str) {
        self.closed.store(true, Ordering::Release);
        let slots: Vec<ReplySlot> = self.inflight.lock().drain(..).collect();
        if !slots.is_empty() {
            warn!(outstanding = slots.len(), reason, "failing in-flight replies");
        }
        for slot in slots {
            slot(Err(ClientError::ConnectionLost(reason.to_string())));
        }
    }
}

/// Client for a Redis-compatible server
pub struct RespClient {
    addr: String,
    queue: Mutex<Queue>,
    tx: mpsc::UnboundedSender<Pipeline>,
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl RespClient {
    /// Connect to `config.addr`
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let stream = tokio::time::timeout(
            config.connect_timeout(),
            TcpStream::connect(&config.addr),
        )
        .await
        .map_err(|_| ClientError::ConnectTimeout(config.addr.clone()))??;
        stream.set_nodelay(config.nodelay)?;

        info!(addr = %config.addr, "connected");
        Ok(Self::from_stream(stream, config))
    }

    fn from_stream(stream: TcpStream, config: &ClientConfig) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        tokio::spawn(write_loop(write_half, rx, Arc::clone(&shared)));
        let reader = tokio::spawn(read_loop(
            read_half,
            Arc::clone(&shared),
            config.read_buffer_size,
        ));

        Self {
            addr: config.addr.clone(),
            queue: Mutex::new(Queue::default()),
            tx,
            shared,
            reader,
        }
    }

    /// Server address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// False once the connection has failed
    pub fn is_connected(&self) -> bool {
        !self.shared.closed.load(Ordering::Acquire)
    }

    fn enqueue<T: Send + 'static>(
        &self,
        args: &[&[u8]],
        convert: fn(Frame) -> ClientResult<T>,
    ) -> PendingReply<T> {
        let (tx, pending) = PendingReply::channel();
        let slot: ReplySlot = Box::new(move |result| {
            let _ = tx.send(result.and_then(convert));
        });

        let mut queue = self.queue.lock();
        encode_command(args, &mut queue.buf);
        queue.slots.push(slot);
        pending
    }
}

impl Drop for RespClient {
    fn drop(&mut self) {
        // The writer exits on its own once `tx` is dropped.
        self.reader.abort();
    }
}

#[async_trait]
impl KvClient for RespClient {
    fn set(&self, key: &str, value: Bytes) -> PendingReply<()> {
        self.enqueue(&[b"SET".as_slice(), key.as_bytes(), &value[..]], expect_ok)
    }

    fn get(&self, key: &str) -> PendingReply<Option<Bytes>> {
        self.enqueue(&[b"GET".as_slice(), key.as_bytes()], expect_bulk)
    }

    fn commit(&self) -> ClientResult<()> {
        let mut queue = self.queue.lock();
        if queue.slots.is_empty() {
            return Ok(());
        }
        let pipeline = Pipeline {
            payload: queue.buf.split().freeze(),
            slots: std::mem::take(&mut queue.slots),
        };

        // Dropped slots resolve their replies as ConnectionClosed.
        if !self.is_connected() {
            return Err(ClientError::ConnectionClosed);
        }
        debug!(
            commands = pipeline.slots.len(),
            bytes = pipeline.payload.len(),
            "committing pipeline"
        );
        self.tx
            .send(pipeline)
            .map_err(|_| ClientError::ConnectionClosed)
    }

    async fn sync_commit(&self) -> ClientResult<()> {
        // Replies arrive in order, so the trailing PING resolves last.
        let marker = self.enqueue(&[b"PING".as_slice()], expect_pong);
        self.commit()?;
        marker.wait().await
    }

    async fn ping(&self) -> ClientResult<()> {
        self.sync_commit().await
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Pipeline>,
    shared: Arc<Shared>,
) {
    while let Some(pipeline) = rx.recv().await {
        shared.inflight.lock().extend(pipeline.slots);
        if shared.closed.load(Ordering::Acquire) {
            shared.fail_all("connection closed");
            return;
        }
        if let Err(e) = writer.write_all(&pipeline.payload).await {
            shared.fail_all(&format!("write failed: {e}"));
            return;
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_loop(mut reader: OwnedReadHalf, shared: Arc<Shared>, capacity: usize) {
    let mut buf = BytesMut::with_capacity(capacity);
    loop {
        loop {
            match Frame::parse(&mut buf) {
                Ok(Some(frame)) => {
                    let slot = shared.inflight.lock().pop_front();
                    match slot {
                        Some(slot) => slot(Ok(frame)),
                        None => {
                            shared.fail_all("reply without a pending command");
                            return;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    shared.fail_all(&e.to_string());
                    return;
                }
            }
        }

        match reader.read_buf(&mut buf).await {
            Ok(0) => {
                shared.fail_all("connection closed by server");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                shared.fail_all(&format!("read failed: {e}"));
                return;
            }
        }
    }
}

fn expect_ok(frame: Frame) -> ClientResult<()> {
    match frame {
        Frame::Simple(s) if s == "OK" => Ok(()),
        other => Err(unexpected(other)),
    }
}

fn expect_pong(frame: Frame) -> ClientResult<()> {
    match frame {
        Frame::Simple(s) if s == "PONG" => Ok(()),
        other => Err(unexpected(other)),
    }
}

fn expect_bulk(frame: Frame) -> ClientResult<Option<Bytes>> {
    match frame {
        Frame::Bulk(data) => Ok(Some(data)),
        Frame::Null => Ok(None),
        other => Err(unexpected(other)),
    }
}

fn unexpected(frame: Frame) -> ClientError {
    match frame {
        Frame::Error(msg) => ClientError::Server(msg),
        other => ClientError::Protocol(format!("unexpected reply {other:?}")),
    }
}
