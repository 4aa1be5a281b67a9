//! RespClient against an in-process server

mod common;

use bytes::Bytes;
use common::{MockServer, HANGUP_KEY, READONLY_KEY};
use matkv_store::{ClientConfig, ClientError, KvClient, RespClient};

async fn connect(server: &MockServer) -> RespClient {
    RespClient::connect(&ClientConfig::with_addr(server.addr.clone()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;
    client.ping().await.unwrap();
    assert!(client.is_connected());
    assert_eq!(client.addr(), server.addr);
}

#[tokio::test]
async fn test_pipelined_set_get() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;

    let mut acks = Vec::new();
    let mut reads = Vec::new();
    for i in 0..100u32 {
        let key = format!("mat{i}");
        acks.push(client.set(&key, Bytes::from(i.to_le_bytes().to_vec())));
        reads.push(client.get(&key));
    }
    // Nothing has been sent yet
    assert_eq!(server.keys(), 0);

    client.sync_commit().await.unwrap();
    assert_eq!(server.keys(), 100);

    for ack in acks {
        ack.wait().await.unwrap();
    }
    for (i, read) in reads.into_iter().enumerate() {
        let value = read.wait().await.unwrap().unwrap();
        assert_eq!(&value[..], &(i as u32).to_le_bytes());
    }
}

#[tokio::test]
async fn test_large_value() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;

    // One 850x600 BGR frame plus header
    let value = Bytes::from(vec![0xab; 850 * 600 * 3 + 20]);
    client.set("big", value.clone());
    let read = client.get("big");
    client.commit().unwrap();

    assert_eq!(read.wait().await.unwrap(), Some(value));
}

#[tokio::test]
async fn test_missing_key_is_none() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;

    let read = client.get("absent");
    client.commit().unwrap();
    assert_eq!(read.wait().await.unwrap(), None);
}

#[tokio::test]
async fn test_server_error_is_surfaced() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;

    let refused = client.set(READONLY_KEY, Bytes::from_static(b"x"));
    let accepted = client.set("fine", Bytes::from_static(b"y"));
    client.sync_commit().await.unwrap();

    let err = refused.wait().await.unwrap_err();
    assert!(matches!(err, ClientError::Server(msg) if msg.starts_with("READONLY")));
    accepted.wait().await.unwrap();
}

#[tokio::test]
async fn test_connection_loss_fails_pending_replies() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;

    let before = client.set("a", Bytes::from_static(b"1"));
    let doomed = client.get(HANGUP_KEY);
    let after = client.get("a");
    client.commit().unwrap();

    before.wait().await.unwrap();
    assert!(matches!(doomed.wait().await, Err(ClientError::ConnectionLost(_))));
    assert!(matches!(after.wait().await, Err(ClientError::ConnectionLost(_))));
    assert!(!client.is_connected());

    let late = client.get("a");
    assert!(matches!(client.commit(), Err(ClientError::ConnectionClosed)));
    assert!(matches!(late.wait().await, Err(ClientError::ConnectionClosed)));
}

#[tokio::test]
async fn test_commit_with_empty_queue() {
    let server = MockServer::spawn().await;
    let client = connect(&server).await;
    client.commit().unwrap();
    client.sync_commit().await.unwrap();
}
