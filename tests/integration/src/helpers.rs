//! Test helpers for integration tests
//!
//! Spawns a gateway over the in-memory store on a loopback port and drives it
//! with WebSocket clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use futures_util::{SinkExt, StreamExt};
use relay_common::AppConfig;
use relay_core::UserProfile;
use relay_db::MemoryMessageStore;
use relay_gateway::protocol::{ClientEvent, ServerEvent};
use relay_gateway::{create_app, serve_until, GatewayState};
use reqwest::{Client, Response};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::default_profiles;

/// How long to wait for an expected event or state change
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to listen before concluding that no event is coming
const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: GatewayState,
    pub store: Arc<MemoryMessageStore>,
    shutdown: Option<oneshot::Sender<()>>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server seeded with the default profiles
    pub async fn start() -> Result<Self> {
        Self::start_with_profiles(default_profiles()).await
    }

    /// Start a test server seeded with the given profiles
    pub async fn start_with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Result<Self> {
        let store = Arc::new(MemoryMessageStore::with_profiles(profiles));
        let state = GatewayState::new(store.clone(), test_config()?);
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            serve_until(app, listener, shutdown).await.ok();
        });

        let client = Client::builder().timeout(WAIT_TIMEOUT).build()?;

        Ok(Self {
            addr,
            client,
            state,
            store,
            shutdown: Some(shutdown_tx),
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL, optionally declaring a user identity
    pub fn socket_url(&self, user_id: Option<&str>) -> String {
        match user_id {
            Some(user_id) => format!("ws://{}/socket?userId={user_id}", self.addr),
            None => format!("ws://{}/socket", self.addr),
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a WebSocket and wait until the gateway has accepted it
    pub async fn connect(&self, user_id: Option<&str>) -> Result<TestClient> {
        let before = self.state.connection_manager().connection_count();
        let (stream, _) = connect_async(self.socket_url(user_id)).await?;

        self.wait_until(|state| state.connection_manager().connection_count() > before)
            .await?;

        Ok(TestClient { stream })
    }

    /// Close a client and wait until the gateway has released it
    pub async fn disconnect(&self, client: TestClient) -> Result<()> {
        let before = self.state.connection_manager().connection_count();
        client.close().await?;

        self.wait_until(|state| state.connection_manager().connection_count() < before)
            .await
    }

    /// Poll gateway state until `condition` holds
    pub async fn wait_until<F>(&self, condition: F) -> Result<()>
    where
        F: Fn(&GatewayState) -> bool,
    {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while !condition(&self.state) {
            if Instant::now() > deadline {
                bail!("Timed out waiting for gateway state");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// A WebSocket client speaking the gateway protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Send a client event
    pub async fn send_event(&mut self, event: &ClientEvent) -> Result<()> {
        self.send_raw(&event.to_json()?).await
    }

    /// Send an arbitrary text frame
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a binary frame
    pub async fn send_binary(&mut self, data: Vec<u8>) -> Result<()> {
        self.stream.send(Message::Binary(data)).await?;
        Ok(())
    }

    /// Wait for the next server event
    pub async fn recv_event(&mut self) -> Result<ServerEvent> {
        let text = tokio::time::timeout(WAIT_TIMEOUT, self.next_text()).await??;
        Ok(ServerEvent::from_json(&text)?)
    }

    /// Assert that no event arrives within a short quiet period
    pub async fn expect_no_event(&mut self) -> Result<()> {
        match tokio::time::timeout(QUIET_PERIOD, self.next_text()).await {
            Err(_) => Ok(()),
            Ok(Ok(text)) => bail!("Unexpected event: {text}"),
            Ok(Err(e)) => Err(e),
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Close(_))) | None => bail!("Connection closed"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| match key {
        "GATEWAY_HOST" => Some("127.0.0.1".to_string()),
        "GATEWAY_PORT" => Some("0".to_string()),
        "RELAY_OUTBOUND_BUFFER" => Some("32".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    Ok(config)
}
