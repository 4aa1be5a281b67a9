//! In-process RESP server for client tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use matkv_store::client::Frame;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// `GET` of this key makes the server drop the connection without replying
pub const HANGUP_KEY: &str = "__hangup__";

/// `SET` of this key is refused the way a read-only replica would
pub const READONLY_KEY: &str = "__readonly__";

type Db = Arc<Mutex<HashMap<Bytes, Bytes>>>;

pub struct MockServer {
    pub addr: String,
    db: Db,
}

impl MockServer {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let db: Db = Arc::default();

        let shared = Arc::clone(&db);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, Arc::clone(&shared)));
            }
        });

        Self { addr, db }
    }

    pub fn keys(&self) -> usize {
        self.db.lock().len()
    }

    pub fn raw_insert(&self, key: &str, value: &[u8]) {
        self.db
            .lock()
            .insert(Bytes::copy_from_slice(key.as_bytes()), Bytes::copy_from_slice(value));
    }
}

async fn serve(mut socket: TcpStream, db: Db) {
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        let mut out = BytesMut::new();
        while let Some(frame) = Frame::parse(&mut buf).unwrap() {
            match execute(frame, &db) {
                Some(reply) => reply.encode(&mut out),
                None => {
                    // Flush what was answered so far, then hang up
                    let _ = socket.write_all(&out).await;
                    return;
                }
            }
        }
        if !out.is_empty() && socket.write_all(&out).await.is_err() {
            return;
        }
        match socket.read_buf(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

fn execute(frame: Frame, db: &Db) -> Option<Frame> {
    let Frame::Array(items) = frame else {
        return Some(Frame::Error("ERR expected array".into()));
    };
    let args: Vec<Bytes> = items
        .into_iter()
        .filter_map(|item| match item {
            Frame::Bulk(data) => Some(data),
            _ => None,
        })
        .collect();

    let reply = match (args.first().map(|a| &a[..]), args.len()) {
        (Some(b"PING"), 1) => Frame::Simple("PONG".into()),
        (Some(b"SET"), 3) if &args[1][..] == READONLY_KEY.as_bytes() => {
            Frame::Error("READONLY You can't write against a read only replica.".into())
        }
        (Some(b"SET"), 3) => {
            db.lock().insert(args[1].clone(), args[2].clone());
            Frame::Simple("OK".into())
        }
        (Some(b"GET"), 2) if &args[1][..] == HANGUP_KEY.as_bytes() => return None,
        (Some(b"GET"), 2) => match db.lock().get(&args[1]) {
            Some(value) => Frame::Bulk(value.clone()),
            None => Frame::Null,
        },
        _ => Frame::Error("ERR unknown command".into()),
    };
    Some(reply)
}
