//! TCP session with the ISM8 gateway.
//!
//! The connection direction is inverted compared to most field buses: the
//! gateway is configured with our address and *it* connects to *us*. The
//! [`Ism8`] handle therefore listens, accepts one gateway connection at a
//! time, mirrors every pushed value and acknowledges each telegram so the
//! gateway keeps sending.
//!
//! # Example
//!
//! ```no_run
//! use wolf_ism8::{Ism8, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> wolf_ism8::Result<()> {
//!     let ism8 = Ism8::new(SessionConfig::new());
//!     ism8.register_callback(|id, def, value| {
//!         let name = def.map(|d| d.name).unwrap_or("unknown");
//!         println!("datapoint {id} ({name}) = {:?}", value.value);
//!     });
//!     ism8.serve().await
//! }
//! ```

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{Ism8Error, Result};
use crate::registry::{self, DatapointDefinition};
use crate::state::{DatapointValue, StateMirror};
use crate::telegram::{
    build_ack, build_request_all, build_write, Framer, Telegram, SERVICE_DATAPOINT_VALUE_IND,
    SERVICE_DATAPOINT_VALUE_RES,
};
use crate::value::Value;

/// Default ISM8 target port; the gateway firmware connects here.
pub const DEFAULT_PORT: u16 = 12004;

const READ_CHUNK: usize = 1024;

/// Listener configuration, built fluently.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wolf_ism8::SessionConfig;
///
/// let config = SessionConfig::new()
///     .bind_addr("127.0.0.1")
///     .port(12004)
///     .idle_timeout(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    bind_addr: String,
    port: u16,
    idle_timeout: Option<Duration>,
    max_buffered: usize,
}

impl SessionConfig {
    /// Creates the default configuration: listen on all interfaces at
    /// port 12004, no idle timeout, 8 KiB receive buffer limit.
    pub fn new() -> Self {
        SessionConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            idle_timeout: None,
            max_buffered: 8192,
        }
    }

    /// Address to listen on.
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Port to listen on. The gateway firmware always dials 12004.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Drops the connection when the gateway stays silent this long.
    /// A healthy gateway pushes values every few seconds.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Upper bound for buffered, unparsed input per connection.
    pub fn max_buffered(mut self, bytes: usize) -> Self {
        self.max_buffered = bytes;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::new()
    }
}

/// Callback invoked for every datapoint value stored in the mirror.
pub type UpdateCallback =
    Box<dyn Fn(u16, Option<&'static DatapointDefinition>, &DatapointValue) + Send + Sync>;

/// Command byte the gateway uses on value indication entries.
const COMMAND_VALUE_IND: u8 = 0x03;

struct Inner {
    config: SessionConfig,
    mirror: Mutex<StateMirror>,
    callbacks: Mutex<Vec<UpdateCallback>>,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    peer: Mutex<Option<SocketAddr>>,
    local: Mutex<Option<SocketAddr>>,
}

/// Handle to the gateway session.
///
/// Cheap to clone; all clones share the same mirror and connection.
#[derive(Clone)]
pub struct Ism8 {
    inner: Arc<Inner>,
}

impl Ism8 {
    /// Creates a session handle. Nothing happens on the network until
    /// [`serve`](Ism8::serve) runs.
    pub fn new(config: SessionConfig) -> Self {
        Ism8 {
            inner: Arc::new(Inner {
                config,
                mirror: Mutex::new(StateMirror::new()),
                callbacks: Mutex::new(Vec::new()),
                writer: tokio::sync::Mutex::new(None),
                peer: Mutex::new(None),
                local: Mutex::new(None),
            }),
        }
    }

    /// Binds the configured address and serves gateway connections until
    /// the listener fails.
    pub async fn serve(&self) -> Result<()> {
        let addr = format!("{}:{}", self.inner.config.bind_addr, self.inner.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "listening for ISM8 connection");
        self.serve_on(listener).await
    }

    /// Serves gateway connections on an already bound listener.
    ///
    /// Connections are handled one at a time; the gateway firmware only
    /// ever opens one. The datapoint mirror survives reconnects.
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        *self.inner.local.lock().unwrap() = listener.local_addr().ok();
        loop {
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "ISM8 connected");
            let (read_half, write_half) = stream.into_split();
            *self.inner.writer.lock().await = Some(write_half);
            *self.inner.peer.lock().unwrap() = Some(peer);

            self.run_connection(read_half, peer).await;

            *self.inner.writer.lock().await = None;
            *self.inner.peer.lock().unwrap() = None;
            info!(%peer, "ISM8 disconnected");
        }
    }

    /// Reads telegrams until EOF, a framing failure or the idle timeout.
    async fn run_connection(&self, mut read_half: OwnedReadHalf, peer: SocketAddr) {
        let mut framer = Framer::new(self.inner.config.max_buffered);
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let read = match self.inner.config.idle_timeout {
                Some(timeout) => {
                    match tokio::time::timeout(timeout, read_half.read(&mut buf)).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(%peer, ?timeout, "gateway silent, dropping connection");
                            return;
                        }
                    }
                }
                None => read_half.read(&mut buf).await,
            };
            let n = match read {
                Ok(0) => return,
                Ok(n) => n,
                Err(err) => {
                    warn!(%peer, %err, "read failed");
                    return;
                }
            };
            if let Err(err) = framer.extend(&buf[..n]) {
                warn!(%peer, %err, "dropping connection");
                return;
            }
            loop {
                match framer.next_telegram() {
                    Ok(Some(telegram)) => self.handle_telegram(telegram).await,
                    Ok(None) => break,
                    Err(err) => {
                        warn!(%peer, %err, "dropping connection");
                        return;
                    }
                }
            }
        }
    }

    async fn handle_telegram(&self, telegram: Telegram) {
        match telegram.service {
            SERVICE_DATAPOINT_VALUE_IND => {
                let mut any_value = false;
                for entry in &telegram.entries {
                    // Zero length entries carry no value and are skipped.
                    if entry.raw.is_empty() {
                        debug!(datapoint = entry.id, "empty entry skipped");
                        continue;
                    }
                    any_value = true;
                    if entry.command != COMMAND_VALUE_IND {
                        debug!(
                            datapoint = entry.id,
                            command = entry.command,
                            "entry with unexpected command skipped"
                        );
                        continue;
                    }
                    self.apply_entry(entry.id, entry.raw.clone());
                }
                if any_value {
                    self.send(&build_ack(telegram.start_datapoint)).await;
                }
            }
            SERVICE_DATAPOINT_VALUE_RES => {
                debug!(start = telegram.start_datapoint, "write acknowledged");
            }
            service => {
                debug!(service, "ignoring unexpected service");
            }
        }
    }

    /// Stores one received value and notifies callbacks.
    fn apply_entry(&self, id: u16, raw: Vec<u8>) {
        let update = match self.inner.mirror.lock().unwrap().update(id, raw) {
            Ok(update) => update,
            Err(err) => {
                warn!(datapoint = id, %err, "discarding undecodable value");
                return;
            }
        };
        debug!(
            datapoint = id,
            changed = update.changed,
            value = ?update.value.value,
            "value received"
        );
        let callbacks = self.inner.callbacks.lock().unwrap();
        for callback in callbacks.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| {
                callback(id, update.definition, &update.value)
            }));
            if result.is_err() {
                warn!(datapoint = id, "update callback panicked");
            }
        }
    }

    async fn send(&self, frame: &[u8]) {
        let mut writer = self.inner.writer.lock().await;
        if let Some(write_half) = writer.as_mut() {
            if let Err(err) = write_half.write_all(frame).await {
                warn!(%err, "send failed");
            }
        }
    }

    /// Writes a value to the gateway.
    ///
    /// The datapoint must be documented, writable and, where the registry
    /// narrows the range, inside it. The mirror is refreshed with the
    /// written value; callbacks do not fire for our own writes.
    pub async fn write(&self, id: u16, value: &Value) -> Result<()> {
        let def = registry::lookup(id).ok_or(Ism8Error::UnknownDatapoint { id })?;
        if !def.writable {
            return Err(Ism8Error::NotWritable { id });
        }
        if let (Some((min, max)), Some(v)) = (def.write_range, value.as_f64()) {
            if v < min || v > max {
                return Err(Ism8Error::encode(
                    id,
                    format!("value {v} outside allowed range {min}..={max}"),
                ));
            }
        }
        let raw = codec::encode(id, def.data_type, value)?;
        let frame = build_write(id, &raw);
        {
            let mut writer = self.inner.writer.lock().await;
            let write_half = writer.as_mut().ok_or(Ism8Error::NotConnected)?;
            write_half.write_all(&frame).await?;
        }
        debug!(datapoint = id, ?value, "value written");
        // Refresh the mirror with our own write; callbacks stay silent,
        // they announce gateway originated changes only.
        if let Err(err) = self.inner.mirror.lock().unwrap().update(id, raw) {
            warn!(datapoint = id, %err, "mirror refresh after write failed");
        }
        Ok(())
    }

    /// Asks the gateway to re-send every datapoint it knows.
    ///
    /// Useful right after a connection, since the gateway otherwise only
    /// pushes values as they change.
    pub async fn request_all_datapoints(&self) -> Result<()> {
        let mut writer = self.inner.writer.lock().await;
        let write_half = writer.as_mut().ok_or(Ism8Error::NotConnected)?;
        write_half.write_all(&build_request_all()).await?;
        Ok(())
    }

    /// Whether a gateway is currently connected.
    pub fn is_connected(&self) -> bool {
        self.inner.peer.lock().unwrap().is_some()
    }

    /// Address of the connected gateway, if any.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        *self.inner.peer.lock().unwrap()
    }

    /// Local address the session listens on, once serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.inner.local.lock().unwrap()
    }

    /// Registry definition for a datapoint.
    pub fn lookup_definition(&self, id: u16) -> Option<&'static DatapointDefinition> {
        registry::lookup(id)
    }

    /// All documented datapoint definitions, in id order.
    pub fn list_definitions(&self) -> &'static [DatapointDefinition] {
        registry::all()
    }

    /// Latest mirrored state for one datapoint.
    pub fn read_value(&self, id: u16) -> Option<DatapointValue> {
        self.inner.mirror.lock().unwrap().get(id).cloned()
    }

    /// All mirrored datapoint states, sorted by identifier.
    pub fn snapshot(&self) -> Vec<DatapointValue> {
        self.inner.mirror.lock().unwrap().snapshot()
    }

    /// Registers a callback fired for every value indication the gateway
    /// pushes, including repeats of an unchanged value and undocumented
    /// datapoints (which arrive with no definition and no decoded value).
    /// Our own writes do not notify.
    ///
    /// Callbacks run on the session task; keep them short. A panicking
    /// callback is logged and does not affect the session or other
    /// callbacks. Callbacks must not call `register_callback` themselves.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(u16, Option<&'static DatapointDefinition>, &DatapointValue) + Send + Sync + 'static,
    {
        self.inner.callbacks.lock().unwrap().push(Box::new(callback));
    }
}
