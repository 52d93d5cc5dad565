use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use motolink_frame::{FrameError, FrameReader, FrameWriter, ParserStats};
use motolink_protocol::{classify, Command, CommandEncoder, CompletionKind, Event};
use motolink_transport::{is_disconnect, ByteTransport, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::completion::{Completion, PendingCompletion};
use crate::config::DriverConfig;
use crate::correlator::Correlator;
use crate::error::{DriverError, InitError, Result};
use crate::event::DriverEvent;
use crate::handshake::handshake;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

enum LinkState {
    Idle,
    /// Handshake in flight; cancelling the token aborts it.
    Opening(CancellationToken),
    Open(Arc<Session>),
}

/// One opened link. Each session owns its correlator, so a reader that
/// outlives its session can never resolve a command issued on a later one.
struct Session {
    writer: tokio::sync::Mutex<FrameWriter<BoxedWriter>>,
    correlator: Correlator,
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl Session {
    fn new(writer: FrameWriter<BoxedWriter>) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
            correlator: Correlator::new(),
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop the reader and release the pending listener. Returns true only
    /// for the first caller, which owns the terminal event.
    fn shut_down(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        // Resolve the waiter as disconnected before its child token fires.
        self.correlator.close();
        self.cancel.cancel();
        first
    }
}

/// Host-side driver for one motion controller.
///
/// The driver can be shared across tasks (`Arc<Driver>`). Commands are
/// written one at a time; inbound frames are handled by a background reader
/// task spawned by [`Driver::init`].
pub struct Driver {
    config: DriverConfig,
    encoder: CommandEncoder,
    state: Mutex<LinkState>,
    events: broadcast::Sender<DriverEvent>,
    stats: Arc<Mutex<ParserStats>>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

impl Driver {
    /// Create a driver with explicit configuration.
    pub fn new(config: DriverConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            encoder: CommandEncoder::new(config.sign_conventions),
            config,
            state: Mutex::new(LinkState::Idle),
            events,
            stats: Arc::new(Mutex::new(ParserStats::default())),
        }
    }

    /// Open the link and wait for the controller's ready frame.
    ///
    /// Fails fast with [`InitError::AlreadyOpen`] while another link is open
    /// or still handshaking. A [`Driver::close`] during the handshake aborts
    /// it with [`InitError::Closed`].
    pub async fn init<T: ByteTransport>(&self, transport: T) -> Result<()> {
        let mut opening = OpeningGuard::acquire(self)?;

        let link = transport.describe();
        let (reader, writer) = transport.into_split();
        let mut reader = FrameReader::with_config(reader, self.config.parser.clone());
        let mut writer = FrameWriter::with_max_payload(
            Box::new(writer) as BoxedWriter,
            self.config.max_payload_size,
        );

        tokio::select! {
            biased;
            _ = opening.abort.cancelled() => {
                debug!(%link, "handshake aborted by close");
                return Err(InitError::Closed.into());
            }
            result = handshake(&mut reader, &mut writer, self.config.handshake_timeout) => result?,
        }

        let session = Arc::new(Session::new(writer));
        opening.complete(Arc::clone(&session))?;

        info!(%link, "controller ready");
        self.publish(DriverEvent::Ready);

        let context = ReaderContext {
            session,
            events: self.events.clone(),
            stats: Arc::clone(&self.stats),
        };
        tokio::spawn(read_loop(reader, context));

        Ok(())
    }

    /// Encode, frame and write a command.
    ///
    /// Distance/angle commands return [`Completion::Pending`]; the listener
    /// is attached before the bytes go out so a fast notification is never
    /// missed, and detached again if the write fails.
    pub async fn issue(&self, command: Command) -> Result<Completion> {
        let session = self.session()?;
        let payload = self.encoder.encode(&command);

        let completion = match command.completion() {
            CompletionKind::TargetReached => {
                let subscription = session.correlator.subscribe()?;
                self.write(&session, &command, &payload).await?;
                Completion::Pending(PendingCompletion::new(
                    subscription,
                    self.config.completion_timeout,
                    session.cancel.child_token(),
                ))
            }
            CompletionKind::Immediate => {
                self.write(&session, &command, &payload).await?;
                Completion::Immediate
            }
            CompletionKind::Settle { hard } => {
                self.write(&session, &command, &payload).await?;
                let delay = if hard {
                    Duration::ZERO
                } else {
                    self.config.settle_delay
                };
                Completion::Settle(delay)
            }
        };

        Ok(completion)
    }
    pub async fn forward(&self, speed: i32, distance: i32) -> Result<Completion> {
        self.issue(Command::forward(speed, distance)).await
    }

    pub async fn reverse(&self, speed: i32, distance: i32) -> Result<Completion> {
        self.issue(Command::reverse(speed, distance)).await
    }

    /// Rotate in place by `angle` degrees (`[-180, 180]`).
    pub async fn rotate(&self, speed: i32, angle: i32) -> Result<Completion> {
        self.issue(Command::rotate(speed, angle)).await
    }

    pub async fn turn(&self, speed: i32, angle: i32, radius: i32) -> Result<Completion> {
        self.issue(Command::turn(speed, angle, radius)).await
    }

    /// Set raw wheel speeds. Completes once written.
    pub async fn drive_raw(&self, left: i32, right: i32) -> Result<Completion> {
        self.issue(Command::drive_raw(left, right)).await
    }

    /// Stop. Completes after the settling delay, or at once for a hard stop.
    pub async fn stop(&self, hard: bool) -> Result<Completion> {
        self.issue(Command::stop(hard)).await
    }

    pub async fn reset_orientation(&self) -> Result<Completion> {
        self.issue(Command::reset_orientation()).await
    }

    pub async fn keep_heading(&self, speed: i32, heading: i32, distance: i32) -> Result<Completion> {
        self.issue(Command::keep_heading(speed, heading, distance))
            .await
    }

    /// Subscribe to driver notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }

    /// Cancel the pending completion, if any. Returns whether one existed.
    pub fn cancel_pending(&self) -> bool {
        self.current()
            .is_some_and(|session| session.correlator.cancel())
    }

    /// Whether a distance/angle command is awaiting completion.
    pub fn has_pending(&self) -> bool {
        self.current()
            .is_some_and(|session| session.correlator.is_pending())
    }

    /// Whether a link is open and live.
    pub fn is_open(&self) -> bool {
        matches!(&*self.state(), LinkState::Open(session) if session.is_live())
    }

    /// Close the link. Pending completions resolve as disconnected and an
    /// in-flight handshake is aborted.
    pub fn close(&self) {
        let mut state = self.state();
        let session = match &*state {
            LinkState::Open(session) => Arc::clone(session),
            LinkState::Opening(abort) => {
                // The opening init resets the state itself.
                abort.cancel();
                return;
            }
            LinkState::Idle => return,
        };
        *state = LinkState::Idle;
        drop(state);

        if session.shut_down() {
            info!("link closed");
            self.publish(DriverEvent::Close);
        }
    }

    /// Inbound parser counters.
    pub fn stats(&self) -> ParserStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Active configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Option<Arc<Session>> {
        match &*self.state() {
            LinkState::Open(session) => Some(Arc::clone(session)),
            LinkState::Idle | LinkState::Opening(_) => None,
        }
    }

    fn session(&self) -> Result<Arc<Session>> {
        self.current()
            .filter(|session| session.is_live())
            .ok_or(DriverError::NotConnected)
    }

    async fn write(&self, session: &Session, command: &Command, payload: &[u8]) -> Result<()> {
        let mut writer = session.writer.lock().await;
        debug!(
            opcode = command.opcode().name(),
            bytes = ?payload,
            "sending command"
        );
        match writer.send(payload).await {
            Ok(()) => Ok(()),
            Err(FrameError::Io(err)) => Err(self.write_failed(session, err)),
            Err(err) => Err(err.into()),
        }
    }

    fn write_failed(&self, session: &Session, err: io::Error) -> DriverError {
        if is_disconnect(&err) {
            warn!(%err, "link disconnected while writing");
            if session.shut_down() {
                self.publish(DriverEvent::Disconnect);
            }
        } else {
            warn!(%err, "command write failed");
            self.publish(DriverEvent::Error {
                message: err.to_string(),
            });
        }
        DriverError::Transport(TransportError::Io(err))
    }

    fn publish(&self, event: DriverEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        match &*self.state() {
            LinkState::Open(session) => session.cancel.cancel(),
            LinkState::Opening(abort) => abort.cancel(),
            LinkState::Idle => {}
        }
    }
}

/// Holds the `Opening` state; resets to `Idle` unless completed.
struct OpeningGuard<'a> {
    driver: &'a Driver,
    abort: CancellationToken,
    done: bool,
}

impl<'a> OpeningGuard<'a> {
    fn acquire(driver: &'a Driver) -> std::result::Result<Self, InitError> {
        let mut state = driver.state();
        match &*state {
            LinkState::Opening(_) => return Err(InitError::AlreadyOpen),
            LinkState::Open(session) if session.is_live() => return Err(InitError::AlreadyOpen),
            LinkState::Open(_) | LinkState::Idle => {}
        }
        let abort = CancellationToken::new();
        *state = LinkState::Opening(abort.clone());
        Ok(Self {
            driver,
            abort,
            done: false,
        })
    }

    /// Publish the session, unless a close aborted this opening meanwhile.
    fn complete(&mut self, session: Arc<Session>) -> std::result::Result<(), InitError> {
        let mut state = self.driver.state();
        match &*state {
            LinkState::Opening(abort) if !abort.is_cancelled() => {
                *state = LinkState::Open(session);
                self.done = true;
                Ok(())
            }
            _ => {
                session.shut_down();
                Err(InitError::Closed)
            }
        }
    }
}

impl Drop for OpeningGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut state = self.driver.state();
        if matches!(&*state, LinkState::Opening(_)) {
            *state = LinkState::Idle;
        }
    }
}

struct ReaderContext {
    session: Arc<Session>,
    events: broadcast::Sender<DriverEvent>,
    stats: Arc<Mutex<ParserStats>>,
}

impl ReaderContext {
    fn publish(&self, event: DriverEvent) {
        let _ = self.events.send(event);
    }

    fn record(&self, stats: ParserStats) {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = stats;
    }

    fn closed_locally(&self) -> bool {
        self.session.cancel.is_cancelled()
    }

    fn dispatch(&self, event: Event) {
        match event {
            Event::Odometry(odometry) => self.publish(DriverEvent::Odometry(odometry)),
            Event::TargetReached => {
                if !self.session.correlator.notify_target_reached() {
                    debug!("target reached with no pending command");
                }
                self.publish(DriverEvent::TargetReached);
            }
            Event::Ready => debug!("ignoring repeated ready frame"),
            // Already logged by the classifier.
            Event::Unknown { .. } => {}
        }
    }

    /// End the session from the reader side, publishing `terminal` unless a
    /// local close got there first.
    fn finish(&self, terminal: &[DriverEvent]) {
        if self.session.shut_down() {
            for event in terminal {
                self.publish(event.clone());
            }
        }
    }
}

async fn read_loop<R: AsyncRead + Unpin>(mut reader: FrameReader<R>, context: ReaderContext) {
    loop {
        let result = tokio::select! {
            biased;
            _ = context.session.cancel.cancelled() => {
                debug!("reader stopped");
                context.record(reader.stats());
                return;
            }
            result = reader.read_frame() => result,
        };

        context.record(reader.stats());
        match result {
            Ok(frame) => {
                if context.closed_locally() {
                    debug!("dropping frame read after close");
                    return;
                }
                context.dispatch(classify(&frame));
            }
            Err(FrameError::ConnectionClosed) => {
                info!("link closed by peer");
                context.finish(&[DriverEvent::Close]);
                return;
            }
            Err(FrameError::Io(err)) if is_disconnect(&err) => {
                warn!(%err, "link disconnected");
                context.finish(&[DriverEvent::Disconnect]);
                return;
            }
            Err(err) => {
                warn!(%err, "link error, closing");
                context.finish(&[
                    DriverEvent::Error {
                        message: err.to_string(),
                    },
                    DriverEvent::Close,
                ]);
                return;
            }
        }
    }
}
