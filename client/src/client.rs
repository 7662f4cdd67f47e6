use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use lumistrip_protocol::{
    AnimationInfo, Message, RunningAnimationParams, Section, StripInfo, DELIMITER,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::ConnectionConfig,
    framing::FrameSplitter,
    mirror::Mirror,
    subscriber::Subscriber,
    transport::{ReadOutcome, Transport, WriteHandle},
};

const READ_BUFFER_SIZE: usize = 4096;

/// Whether a `set_host`/`set_port` reconfiguration should bring the
/// connection (back) up after applying the change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Reconnect only if the client was running when the change was made.
    #[default]
    IfRunning,
    /// Always connect after the change, even if the client was stopped.
    Always,
    /// Apply the change without connecting; stops the client if running.
    Never,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Status {
    Idle,
    Starting,
    Running,
}

struct Shared {
    status: Status,
    config: ConnectionConfig,
    mirror: Mirror,
    writer: Option<WriteHandle>,
    peer: Option<(String, u16)>,
    recv_task: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
    reconfig_task: Option<JoinHandle<()>>,
}

struct Inner {
    shared: Mutex<Shared>,
    subscribers: Vec<Arc<dyn Subscriber>>,
}

/// Maintains one connection to the animation controller: connects,
/// receives the delimiter-framed message stream on a supervised
/// background task, dispatches each message to the registered
/// subscribers and keeps the local state mirror in sync.
///
/// The handle is cheap to clone; clones share the same connection and
/// mirror. All I/O failures are reported through subscribers, never
/// returned from `start`/`send`.
#[derive(Clone)]
pub struct LedStripClient {
    inner: Arc<Inner>,
}

pub struct LedStripClientBuilder {
    config: ConnectionConfig,
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl LedStripClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribers are notified in registration order.
    pub fn subscribe(mut self, subscriber: Arc<dyn Subscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn build(self) -> LedStripClient {
        LedStripClient {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    status: Status::Idle,
                    config: self.config,
                    mirror: Mirror::default(),
                    writer: None,
                    peer: None,
                    recv_task: None,
                    shutdown: None,
                    reconfig_task: None,
                }),
                subscribers: self.subscribers,
            }),
        }
    }
}

impl LedStripClient {
    pub fn builder() -> LedStripClientBuilder {
        LedStripClientBuilder {
            config: ConnectionConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Connects and launches the receive loop. No-op if already started.
    /// Clears the whole mirror before connecting, so it only ever
    /// reflects the current connection. A failed connect is reported via
    /// `Subscriber::connection_failed` and is not retried.
    pub async fn start(&self) {
        let (endpoint, connect_timeout, read_timeout, host, port) = {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.status != Status::Idle {
                debug!("Client already started, ignoring start request");
                return;
            }
            shared.status = Status::Starting;
            shared.mirror.clear_all();
            (
                shared.config.endpoint(),
                shared.config.connect_timeout(),
                shared.config.read_timeout(),
                shared.config.host.clone(),
                shared.config.port,
            )
        };

        let (transport, peer) =
            match Transport::connect(&endpoint, connect_timeout, read_timeout).await {
                Ok(connected) => connected,
                Err(e) => {
                    warn!("Unable to connect to {}: {}", endpoint, e);
                    self.inner.shared.lock().unwrap().status = Status::Idle;
                    self.notify(|s| s.connection_failed(&host, port));
                    return;
                }
            };

        info!("Connected to controller at {}", peer);
        let peer_ip = peer.ip().to_string();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        {
            let mut shared = self.inner.shared.lock().unwrap();
            shared.writer = Some(transport.write_handle());
            shared.peer = Some((peer_ip.clone(), port));
            shared.shutdown = Some(shutdown_tx);
            shared.status = Status::Running;
        }
        self.notify(|s| s.connected(&peer_ip, port));

        let client = self.clone();
        let handle = tokio::spawn(async move { client.receive_loop(transport, shutdown_rx).await });
        self.inner.shared.lock().unwrap().recv_task = Some(handle);
    }

    /// Fire-and-forget variant of [`start`](Self::start): the whole
    /// connect sequence, including the bounded connect attempt, runs on a
    /// background task.
    pub fn start_headless(&self) {
        let client = self.clone();
        tokio::spawn(async move { client.start().await });
    }

    /// Stops the receive loop and closes the connection. Clears the
    /// supported-animations cache; running animations, sections and strip
    /// info survive until the next `start`. Does not fire
    /// `Subscriber::disconnected` (that event is reserved for closure by
    /// the peer). Safe to call when not started.
    pub async fn end(&self) {
        let (shutdown, task) = {
            let mut shared = self.inner.shared.lock().unwrap();
            shared.status = Status::Idle;
            shared.writer = None;
            shared.peer = None;
            shared.mirror.supported_animations.clear();
            (shared.shutdown.take(), shared.recv_task.take())
        };
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(true);
        }
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Serializes the message, appends the frame delimiter and writes it.
    /// Failures (not connected, peer gone) are logged and swallowed.
    pub async fn send(&self, message: &Message) {
        let writer = self.inner.shared.lock().unwrap().writer.clone();
        let Some(writer) = writer else {
            warn!("Cannot send, not connected");
            return;
        };
        let payload = match message.encode() {
            Ok(encoded) => format!("{}{}", encoded, DELIMITER),
            Err(e) => {
                warn!("Could not encode outgoing message: {}", e);
                return;
            }
        };
        match writer.write(payload.as_bytes()).await {
            Ok(()) => debug!("Sent {:?}", message),
            Err(e) => warn!("Failed to send message: {}", e),
        }
    }

    pub fn set_host(&self, host: impl Into<String>, restart: RestartPolicy) {
        let host = host.into();
        self.reconfigure(restart, move |config| config.host = host);
    }

    pub fn set_port(&self, port: u16, restart: RestartPolicy) {
        self.reconfigure(restart, move |config| config.port = port);
    }

    /// Runs stop → settle delay → change → (maybe) restart on a
    /// background task so the caller is never blocked by the delay.
    /// Last write wins: issuing a new reconfiguration aborts one still
    /// pending, including one sleeping out its settle delay.
    fn reconfigure(
        &self,
        restart: RestartPolicy,
        apply: impl FnOnce(&mut ConnectionConfig) + Send + 'static,
    ) {
        if let Some(previous) = self.inner.shared.lock().unwrap().reconfig_task.take() {
            previous.abort();
        }

        let client = self.clone();
        let task = tokio::spawn(async move {
            let was_running = client.inner.shared.lock().unwrap().status != Status::Idle;
            if was_running {
                client.end().await;
                if restart != RestartPolicy::Never {
                    let settle = client.inner.shared.lock().unwrap().config.settle_delay();
                    tokio::time::sleep(settle).await;
                }
            }
            apply(&mut client.inner.shared.lock().unwrap().config);
            let should_start = match restart {
                RestartPolicy::Always => true,
                RestartPolicy::IfRunning => was_running,
                RestartPolicy::Never => false,
            };
            if should_start {
                client.start().await;
            }
        });
        self.inner.shared.lock().unwrap().reconfig_task = Some(task);
    }

    pub fn is_started(&self) -> bool {
        self.inner.shared.lock().unwrap().status != Status::Idle
    }

    pub fn is_connected(&self) -> bool {
        self.inner.shared.lock().unwrap().status == Status::Running
    }

    pub fn config(&self) -> ConnectionConfig {
        self.inner.shared.lock().unwrap().config.clone()
    }

    /* Mirror snapshots. The receive loop is the sole mutator; these are
     * point-in-time copies and may be stale by the time they are read. */

    pub fn running_animations(&self) -> HashMap<String, RunningAnimationParams> {
        self.inner.shared.lock().unwrap().mirror.running_animations.clone()
    }

    pub fn sections(&self) -> HashMap<String, Section> {
        self.inner.shared.lock().unwrap().mirror.sections.clone()
    }

    pub fn supported_animations(&self) -> HashMap<String, AnimationInfo> {
        self.inner.shared.lock().unwrap().mirror.supported_animations.clone()
    }

    pub fn strip_info(&self) -> Option<StripInfo> {
        self.inner.shared.lock().unwrap().mirror.strip_info.clone()
    }

    fn notify(&self, event: impl Fn(&dyn Subscriber)) {
        for subscriber in &self.inner.subscribers {
            event(subscriber.as_ref());
        }
    }

    async fn receive_loop(self, mut transport: Transport, mut shutdown: watch::Receiver<bool>) {
        enum Exit {
            /// `end()` asked us to stop; exit silently.
            Stopped,
            /// The peer closed the stream or the transport failed.
            Closed,
        }

        let mut splitter = FrameSplitter::new();
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let exit = loop {
            tokio::select! {
                _ = shutdown.changed() => break Exit::Stopped,
                outcome = transport.read(&mut buf) => match outcome {
                    ReadOutcome::TimedOut => continue,
                    ReadOutcome::Closed => break Exit::Closed,
                    ReadOutcome::Data(len) => {
                        let chunk = String::from_utf8_lossy(&buf[..len]).into_owned();
                        for frame in splitter.push(&chunk) {
                            if frame.is_empty() {
                                continue;
                            }
                            self.dispatch(&frame);
                        }
                    }
                }
            }
        };

        transport.close().await;
        if let Exit::Closed = exit {
            let peer = {
                let mut shared = self.inner.shared.lock().unwrap();
                shared.status = Status::Idle;
                shared.writer = None;
                shared.recv_task = None;
                shared.shutdown = None;
                shared.peer.take()
            };
            if let Some((ip, port)) = peer {
                info!("Disconnected from {}:{}", ip, port);
                self.notify(|s| s.disconnected(&ip, port));
            }
        }
    }

    /// One frame: raw-frame event first, then decode, then mirror update
    /// and the kind-specific event. Mirror updates land before the
    /// kind-specific event so subscribers observe post-message state.
    fn dispatch(&self, frame: &str) {
        self.notify(|s| s.frame_received(frame));

        let message = match Message::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!("Unrecognized message: {}", e);
                return;
            }
        };

        match message {
            Message::AnimationInfo(info) => {
                self.inner
                    .shared
                    .lock()
                    .unwrap()
                    .mirror
                    .supported_animations
                    .insert(info.name.clone(), info.clone());
                self.notify(|s| s.animation_info(&info));
            }
            Message::AnimationToRunParams(_) => {
                warn!("Receiving AnimationToRunParams is not supported by the client")
            }
            Message::ClientParams(_) => {
                warn!("Receiving ClientParams is not supported by the client")
            }
            Message::Command(_) => warn!("Receiving Command is not supported by the client"),
            Message::CurrentStripColor(color) => self.notify(|s| s.strip_color(&color)),
            Message::EndAnimation(end) => {
                self.inner
                    .shared
                    .lock()
                    .unwrap()
                    .mirror
                    .running_animations
                    .remove(&end.id);
                self.notify(|s| s.animation_ended(&end));
            }
            Message::Notice(notice) => self.notify(|s| s.notice(&notice)),
            Message::RunningAnimationParams(params) => {
                self.inner
                    .shared
                    .lock()
                    .unwrap()
                    .mirror
                    .running_animations
                    .insert(params.id.clone(), params.clone());
                self.notify(|s| s.animation_started(&params));
            }
            Message::Section(section) => {
                self.inner
                    .shared
                    .lock()
                    .unwrap()
                    .mirror
                    .sections
                    .insert(section.name.clone(), section.clone());
                self.notify(|s| s.section_defined(&section));
            }
            Message::StripInfo(info) => {
                self.inner.shared.lock().unwrap().mirror.strip_info = Some(info.clone());
                self.notify(|s| s.strip_info(&info));
            }
        }
    }
}
