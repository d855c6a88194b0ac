//! WebSocket stream endpoint on top of blocking tungstenite.

use accel_core::{Connection, Connector};
use accel_traits::BoxError;
use std::net::TcpStream;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Conn = WsConnection;

    fn connect(&mut self, url: &str) -> Result<WsConnection, BoxError> {
        let (socket, response) = tungstenite::connect(url)?;
        tracing::debug!(url, status = %response.status(), "websocket handshake complete");
        Ok(WsConnection { socket })
    }
}

pub struct WsConnection {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Connection for WsConnection {
    fn send_text(&mut self, text: &str) -> Result<(), BoxError> {
        self.socket.send(Message::text(text.to_owned()))?;
        Ok(())
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        // Best effort; the peer may already be gone.
        if self.socket.close(None).is_ok() {
            let _ = self.socket.flush();
        }
    }
}
