use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use url::Url;

use composer_client::ProgressSocket;
use composer_core::{ProgressChannel, ProgressStatus};

#[tokio::test]
async fn frames_are_dispatched_to_subscribers() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        ws.send(Message::Text("not json".to_string())).await.unwrap();
        ws.send(Message::Text(
            r#"{"executionId":"exec-1","step":"research","progress":140,"status":"running"}"#
                .to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text(
            r#"{"executionId":"exec-1","step":"research","progress":100,"status":"completed"}"#
                .to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
    });

    let channel = ProgressChannel::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    channel.subscribe(
        "exec-1",
        Arc::new(move |update| {
            let _ = tx.send(update);
        }),
    );

    let url = Url::parse(&format!("ws://{}/progress", address)).unwrap();
    let mut socket = ProgressSocket::spawn_at(url, channel);

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.status, ProgressStatus::Running);
    assert_eq!(first.progress, 100);

    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.status, ProgressStatus::Completed);

    tokio::time::timeout(Duration::from_secs(5), socket.join())
        .await
        .unwrap();
}

#[tokio::test]
async fn connection_failure_ends_the_task_quietly() {
    let url = Url::parse("ws://127.0.0.1:9/progress").unwrap();
    let mut socket = ProgressSocket::spawn_at(url, ProgressChannel::new());

    tokio::time::timeout(Duration::from_secs(5), socket.join())
        .await
        .unwrap();
    assert!(socket.is_finished());
}
