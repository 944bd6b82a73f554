//! Integration tests for the WebSocket connector.
//!
//! A bare `tokio-tungstenite` server stands in for the game server so the
//! bytes really cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::Message;
    use typerace_transport::{Connection, Connector, TransportError, WebSocketConnector};

    /// Binds on an OS-assigned port and returns the listener plus its URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().unwrap();
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: &TcpListener) -> WebSocketStream<tokio::net::TcpStream> {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_connect_and_send_receive() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move { accept(&listener).await });

        let conn = WebSocketConnector::new(url)
            .connect()
            .await
            .expect("should connect");
        let mut server_ws = server.await.expect("task should complete");
        assert!(conn.id().into_inner() > 0);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::Binary(vec![3].into()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv should succeed");
        assert_eq!(received, Some(vec![3]));

        // --- Client sends, server receives ---
        conn.send(&[1, 0, 0, 0, 4]).await.expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[1, 0, 0, 0, 4]);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_server_close() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.send(Message::Close(None)).await.unwrap();
            // Drain until the client's close reply arrives.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let conn = WebSocketConnector::new(url).connect().await.unwrap();
        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
        drop(conn);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_is_not_blocked_by_pending_recv() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            let first = ws.next().await.unwrap().unwrap();
            ws.send(first).await.unwrap();
            ws
        });

        let conn = std::sync::Arc::new(WebSocketConnector::new(url).connect().await.unwrap());
        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        // Give the reader a chance to park on the socket first.
        tokio::task::yield_now().await;

        conn.send(&[3]).await.expect("send should not wait on recv");
        let echoed = reader.await.unwrap().unwrap();
        assert_eq!(echoed, Some(vec![3]));
        drop(server.await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let err = WebSocketConnector::new("not a url")
            .connect()
            .await
            .err()
            .expect("should fail");
        assert!(
            matches!(err, TransportError::InvalidAddress { .. } | TransportError::ConnectFailed(_)),
            "unexpected error: {err}"
        );
    }
}
