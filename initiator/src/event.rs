use common::messages::{Error as MessageError, PtpIpMessage};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, warn};
use std::{
    io,
    net::{Shutdown, TcpStream},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
        Mutex,
        MutexGuard,
    },
    thread::{self, JoinHandle, ThreadId},
};

/// An asynchronous notification decoded off the event connection. The session
/// id is the initiator's at the moment the packet arrived; the responder does
/// not carry it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraEvent {
    pub event_code: u16,
    pub session_id: u32,
    pub transaction_id: u32,
    pub params: [u32; 3],
}

/// Callbacks run on the delivery worker thread, in listener-registration
/// order. A slow listener delays later listeners but never the reader.
pub trait CameraEventListener: Send + Sync {
    fn on_event(&self, event: &CameraEvent);

    /// The event connection died while the initiator was still open. The
    /// initiator is unusable afterwards; reconnecting is the caller's call.
    fn on_error(&self, _error: &io::Error) {}
}

/// State shared between the caller-facing engine and the two background
/// threads. The listener registry is the only piece written from arbitrary
/// caller threads while the worker reads it.
pub(crate) struct Shared {
    pub(crate) closed: AtomicBool,
    pub(crate) session_id: AtomicU32,
    listeners: Mutex<Vec<Arc<dyn CameraEventListener>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            session_id: AtomicU32::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Registers a listener; false if this exact listener is already present.
    pub(crate) fn add_listener(&self, listener: Arc<dyn CameraEventListener>) -> bool {
        let mut listeners = lock(&self.listeners);
        if listeners
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &listener))
        {
            return false;
        }
        listeners.push(listener);
        true
    }

    pub(crate) fn remove_listener(&self, listener: &Arc<dyn CameraEventListener>) -> bool {
        let mut listeners = lock(&self.listeners);
        let count = listeners.len();
        listeners.retain(|existing| !Arc::ptr_eq(existing, listener));
        listeners.len() != count
    }

    fn snapshot(&self) -> Vec<Arc<dyn CameraEventListener>> {
        lock(&self.listeners).clone()
    }
}

enum Delivery {
    Event(CameraEvent),
    ConnectionLost(io::Error),
}

pub(crate) struct EventSubsystem {
    pub(crate) reader: JoinHandle<()>,
    pub(crate) worker: JoinHandle<()>,
    pub(crate) worker_thread: ThreadId,
}

/// Spawns the event reader and the delivery worker. The reader owns the only
/// queue sender, so the worker drains and exits once the reader stops.
pub(crate) fn start(
    shared: Arc<Shared>,
    event_stream: Arc<TcpStream>,
    command_stream: Arc<TcpStream>,
) -> EventSubsystem {
    let (sender, receiver) = unbounded();

    let reader = thread::spawn({
        let shared = Arc::clone(&shared);
        move || read_events(&shared, &event_stream, &command_stream, sender)
    });
    let worker = thread::spawn(move || deliver(&shared, receiver));
    let worker_thread = worker.thread().id();

    EventSubsystem {
        reader,
        worker,
        worker_thread,
    }
}

fn read_events(
    shared: &Shared,
    event_stream: &TcpStream,
    command_stream: &TcpStream,
    sender: Sender<Delivery>,
) {
    loop {
        let message = match PtpIpMessage::read_from(&mut &*event_stream) {
            Ok(message) => message,
            Err(error) => {
                // Expected when close() shut the socket under us.
                if shared.closed.load(Ordering::Acquire) {
                    return;
                }
                fail(shared, event_stream, command_stream, &sender, to_io_error(error));
                return;
            }
        };

        let packet = match message {
            PtpIpMessage::Event(packet) => packet,
            other => {
                if shared.closed.load(Ordering::Acquire) {
                    return;
                }
                let error = io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected {} packet on the event connection", other.name()),
                );
                fail(shared, event_stream, command_stream, &sender, error);
                return;
            }
        };

        let event = CameraEvent {
            event_code: packet.event_code,
            session_id: shared.session_id.load(Ordering::Acquire),
            transaction_id: packet.transaction_id,
            params: packet.params,
        };

        if sender.send(Delivery::Event(event)).is_err() {
            return;
        }
    }
}

/// Fatal event-connection loss: mark the initiator closed, drop both sockets'
/// connections, and let listeners hear about it before the worker drains out.
fn fail(
    shared: &Shared,
    event_stream: &TcpStream,
    command_stream: &TcpStream,
    sender: &Sender<Delivery>,
    error: io::Error,
) {
    error!("event connection lost: {}", error);
    shared.closed.store(true, Ordering::Release);
    let _ = event_stream.shutdown(Shutdown::Both);
    let _ = command_stream.shutdown(Shutdown::Both);
    if sender.send(Delivery::ConnectionLost(error)).is_err() {
        warn!("event delivery worker exited before connection loss was reported");
    }
}

fn deliver(shared: &Shared, receiver: Receiver<Delivery>) {
    while let Ok(delivery) = receiver.recv() {
        // Dispatch runs outside the registry lock: removals never wait on a
        // callback, and additions show up for the next delivery.
        let listeners = shared.snapshot();
        match delivery {
            Delivery::Event(event) => {
                for listener in &listeners {
                    listener.on_event(&event);
                }
            }
            Delivery::ConnectionLost(error) => {
                for listener in &listeners {
                    listener.on_error(&error);
                }
            }
        }
    }
}

fn to_io_error(error: MessageError) -> io::Error {
    match error {
        MessageError::StdIo(error) => error,
        MessageError::Truncated => {
            io::Error::new(io::ErrorKind::UnexpectedEof, MessageError::Truncated)
        }
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
