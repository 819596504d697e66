use crate::{
    error::InitiatorError,
    event::{self, CameraEventListener, EventSubsystem, Shared},
    transaction::TransactionSequencer,
};
use common::{
    constants::{ops, rsp, DATA_PHASE_INFO, NO_SESSION, PTPIP_VERSION},
    messages::{
        device::DeviceInfo,
        from_bytes,
        ptpip::{
            EndData,
            Guid,
            InitCommandRequest,
            InitEventRequest,
            OperationRequest,
            StartData,
        },
        to_bytes,
        MessageComponent,
        PtpIpMessage,
    },
};
use log::debug;
use std::{
    io::Write,
    net::{Shutdown, TcpStream, ToSocketAddrs},
    sync::{atomic::Ordering, Arc},
    thread,
};

/// The operation response record: wire response code, the session it arrived
/// under, the transaction it answers, and up to five parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub response_code: u16,
    pub session_id: u32,
    pub transaction_id: u32,
    pub params: [u32; 5],
}

/// The client side of a PTP-IP link. Construction performs the full two-phase
/// handshake; afterwards every command-data call blocks the calling thread
/// while events arrive concurrently on the background reader.
pub struct Initiator {
    command: Arc<TcpStream>,
    event: Arc<TcpStream>,
    shared: Arc<Shared>,
    sequencer: TransactionSequencer,
    responder: ResponderInfo,
    subsystem: Option<EventSubsystem>,
}

impl std::fmt::Debug for Initiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiator")
            .field("responder", &self.responder)
            .finish_non_exhaustive()
    }
}

/// Identity the responder sent back in InitCommandAck.
#[derive(Debug, Clone)]
pub struct ResponderInfo {
    pub connection_number: u32,
    pub guid: Guid,
    pub name: String,
    pub version: u32,
}

impl Initiator {
    /// Opens the command-data and event connections in order, running the
    /// init handshake on each. Sockets already opened are closed on any
    /// failure (drop semantics); the event reader only starts once both acks
    /// are in.
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        client_guid: Guid,
        client_name: &str,
    ) -> Result<Self, InitiatorError> {
        let command = TcpStream::connect(&addr)?;
        PtpIpMessage::from(InitCommandRequest {
            guid: client_guid,
            name: client_name.to_owned(),
            version: PTPIP_VERSION,
        })
        .write_to(&mut &command)?;

        let ack = match PtpIpMessage::read_from(&mut &command)? {
            PtpIpMessage::InitCommandAck(ack) => ack,
            PtpIpMessage::InitFail(fail) => {
                return Err(InitiatorError::HandshakeRejected {
                    reason: fail.reason,
                })
            }
            other => {
                return Err(InitiatorError::Handshake {
                    expected: "InitCommandAck",
                    actual: other.name(),
                })
            }
        };

        let event_stream = TcpStream::connect(&addr)?;
        PtpIpMessage::from(InitEventRequest {
            connection_number: ack.connection_number,
        })
        .write_to(&mut &event_stream)?;

        match PtpIpMessage::read_from(&mut &event_stream)? {
            PtpIpMessage::InitEventAck(_) => {}
            PtpIpMessage::InitFail(fail) => {
                return Err(InitiatorError::HandshakeRejected {
                    reason: fail.reason,
                })
            }
            other => {
                return Err(InitiatorError::Handshake {
                    expected: "InitEventAck",
                    actual: other.name(),
                })
            }
        }

        debug!(
            "connected to \"{}\" as connection {}",
            ack.name, ack.connection_number
        );

        let command = Arc::new(command);
        let event = Arc::new(event_stream);
        let shared = Arc::new(Shared::new());
        let subsystem = event::start(
            Arc::clone(&shared),
            Arc::clone(&event),
            Arc::clone(&command),
        );

        Ok(Self {
            command,
            event,
            shared,
            sequencer: TransactionSequencer::new(),
            responder: ResponderInfo {
                connection_number: ack.connection_number,
                guid: ack.guid,
                name: ack.name,
                version: ack.version,
            },
            subsystem: Some(subsystem),
        })
    }

    pub fn responder(&self) -> &ResponderInfo {
        &self.responder
    }

    /// The currently open session id, or 0 when no session is open.
    pub fn session_id(&self) -> u32 {
        self.shared.session_id.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), InitiatorError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(InitiatorError::Closed);
        }
        Ok(())
    }

    /// Writes an OperationRequest with up to five parameters (missing ones
    /// default to 0) and returns the transaction id it was issued under.
    /// Does not wait for the response.
    pub fn send_operation(&mut self, code: u16, params: &[u32]) -> Result<u32, InitiatorError> {
        self.ensure_open()?;
        if params.len() > 5 {
            return Err(InitiatorError::TooManyParameters(params.len()));
        }

        let mut padded = [0u32; 5];
        padded[.. params.len()].copy_from_slice(params);

        let transaction_id = self.sequencer.next();
        PtpIpMessage::from(OperationRequest {
            data_phase_info: DATA_PHASE_INFO,
            operation_code: code,
            transaction_id,
            params: padded,
        })
        .write_to(&mut &*self.command)?;
        Ok(transaction_id)
    }

    /// Blocks for the next frame on the command-data connection, which must
    /// be an OperationResponse; anything else means the connection is
    /// desynchronized and the initiator must be discarded.
    pub fn receive_response(&mut self) -> Result<Response, InitiatorError> {
        self.ensure_open()?;
        match PtpIpMessage::read_from(&mut &*self.command)? {
            PtpIpMessage::OperationResponse(response) => Ok(Response {
                response_code: response.response_code,
                session_id: self.session_id(),
                transaction_id: response.transaction_id,
                params: response.params,
            }),
            other => Err(InitiatorError::UnexpectedPacket {
                expected: "OperationResponse",
                actual: other.name(),
            }),
        }
    }

    /// Like [`receive_response`](Self::receive_response) but turns any non-Ok
    /// response code into [`InitiatorError::Operation`].
    pub fn check_and_read_response(&mut self) -> Result<Response, InitiatorError> {
        let response = self.receive_response()?;
        if response.response_code != rsp::OK {
            return Err(InitiatorError::Operation {
                code: response.response_code,
            });
        }
        Ok(response)
    }

    /// Sends a complete data phase under the next transaction id: StartData
    /// followed by a single EndData carrying the whole payload. The send side
    /// never splits into intermediate Data packets.
    pub fn send_data(&mut self, data: &[u8]) -> Result<(), InitiatorError> {
        self.ensure_open()?;
        let transaction_id = self.sequencer.next();
        PtpIpMessage::from(StartData {
            transaction_id,
            total_length: data.len() as u64,
        })
        .write_to(&mut &*self.command)?;
        PtpIpMessage::from(EndData {
            transaction_id,
            payload: data.to_vec(),
        })
        .write_to(&mut &*self.command)?;
        Ok(())
    }

    /// Receives a complete data phase into a byte vector.
    pub fn receive_data(&mut self) -> Result<Vec<u8>, InitiatorError> {
        let mut data = Vec::new();
        self.receive_data_into(&mut data)?;
        Ok(data)
    }

    /// Receives a data phase, streaming fragments into `sink` in arrival
    /// order: StartData, zero or more Data packets, then the closing EndData.
    /// A responder may answer with an immediate OperationResponse instead;
    /// a non-Ok code there becomes an operation error, while an Ok one is a
    /// protocol violation (data was promised).
    pub fn receive_data_into<W: Write>(&mut self, sink: &mut W) -> Result<(), InitiatorError> {
        self.ensure_open()?;
        match PtpIpMessage::read_from(&mut &*self.command)? {
            PtpIpMessage::StartData(_) => {}
            PtpIpMessage::OperationResponse(response) => {
                if response.response_code == rsp::OK {
                    return Err(InitiatorError::UnexpectedPacket {
                        expected: "StartData",
                        actual: "OperationResponse",
                    });
                }
                return Err(InitiatorError::Operation {
                    code: response.response_code,
                });
            }
            other => {
                return Err(InitiatorError::UnexpectedPacket {
                    expected: "StartData",
                    actual: other.name(),
                })
            }
        }

        loop {
            match PtpIpMessage::read_from(&mut &*self.command)? {
                PtpIpMessage::Data(fragment) => sink.write_all(&fragment.payload)?,
                PtpIpMessage::EndData(fragment) => {
                    sink.write_all(&fragment.payload)?;
                    return Ok(());
                }
                other => {
                    return Err(InitiatorError::UnexpectedPacket {
                        expected: "Data or EndData",
                        actual: other.name(),
                    })
                }
            }
        }
    }

    /// GetDeviceInfo: operation, data phase, response check, decoded dataset.
    pub fn get_device_info(&mut self) -> Result<DeviceInfo, InitiatorError> {
        self.send_operation(ops::GET_DEVICE_INFO, &[])?;
        let data = self.receive_data()?;
        self.check_and_read_response()?;
        from_bytes(&data).map_err(Into::into)
    }

    /// Opens a session. Id 0 is the reserved "no session" value and is
    /// rejected locally.
    pub fn open_session(&mut self, session_id: u32) -> Result<(), InitiatorError> {
        if session_id == NO_SESSION {
            return Err(InitiatorError::InvalidSessionId);
        }
        self.send_operation(ops::OPEN_SESSION, &[session_id])?;
        self.check_and_read_response()?;
        self.shared.session_id.store(session_id, Ordering::Release);
        debug!("session {} open", session_id);
        Ok(())
    }

    pub fn close_session(&mut self) -> Result<(), InitiatorError> {
        self.send_operation(ops::CLOSE_SESSION, &[])?;
        self.check_and_read_response()?;
        self.shared.session_id.store(NO_SESSION, Ordering::Release);
        debug!("session closed");
        Ok(())
    }

    /// Triggers a capture with default storage and format.
    pub fn initiate_capture(&mut self) -> Result<(), InitiatorError> {
        self.send_operation(ops::INITIATE_CAPTURE, &[0, 0])?;
        self.check_and_read_response()?;
        Ok(())
    }

    /// Reads a device property's raw value bytes.
    pub fn get_device_prop_value(&mut self, code: u16) -> Result<Vec<u8>, InitiatorError> {
        self.send_operation(ops::GET_DEVICE_PROP_VALUE, &[u32::from(code)])?;
        let data = self.receive_data()?;
        self.check_and_read_response()?;
        Ok(data)
    }

    /// Reads a device property and decodes it as `T`.
    pub fn get_device_prop<T: MessageComponent>(&mut self, code: u16) -> Result<T, InitiatorError> {
        let data = self.get_device_prop_value(code)?;
        from_bytes(&data).map_err(Into::into)
    }

    pub fn get_device_prop_u8(&mut self, code: u16) -> Result<u8, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_u16(&mut self, code: u16) -> Result<u16, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_u32(&mut self, code: u16) -> Result<u32, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_u64(&mut self, code: u16) -> Result<u64, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_u128(&mut self, code: u16) -> Result<u128, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_i8(&mut self, code: u16) -> Result<i8, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_i16(&mut self, code: u16) -> Result<i16, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_i32(&mut self, code: u16) -> Result<i32, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_i64(&mut self, code: u16) -> Result<i64, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_i128(&mut self, code: u16) -> Result<i128, InitiatorError> {
        self.get_device_prop(code)
    }

    pub fn get_device_prop_string(&mut self, code: u16) -> Result<String, InitiatorError> {
        self.get_device_prop(code)
    }

    /// Writes a device property from raw value bytes.
    pub fn set_device_prop_value(&mut self, code: u16, value: &[u8]) -> Result<(), InitiatorError> {
        self.send_operation(ops::SET_DEVICE_PROP_VALUE, &[u32::from(code)])?;
        self.send_data(value)?;
        self.check_and_read_response()?;
        Ok(())
    }

    /// Writes a device property from a typed value.
    pub fn set_device_prop<T: MessageComponent>(
        &mut self,
        code: u16,
        value: &T,
    ) -> Result<(), InitiatorError> {
        let bytes = to_bytes(value)?;
        self.set_device_prop_value(code, &bytes)
    }

    pub fn set_device_prop_string(&mut self, code: u16, value: &str) -> Result<(), InitiatorError> {
        self.set_device_prop(code, &value.to_owned())
    }

    /// Registers an event listener; false if it was already registered.
    pub fn add_listener(&self, listener: Arc<dyn CameraEventListener>) -> bool {
        self.shared.add_listener(listener)
    }

    /// Unregisters a listener by identity; false if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn CameraEventListener>) -> bool {
        self.shared.remove_listener(listener)
    }

    /// Shuts both connections down and waits for the background threads.
    /// Idempotent. Safe to call from inside a listener callback: the delivery
    /// worker is left to drain itself rather than joined from its own thread.
    pub fn close(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        let _ = self.event.shutdown(Shutdown::Both);
        let _ = self.command.shutdown(Shutdown::Both);

        if let Some(subsystem) = self.subsystem.take() {
            let _ = subsystem.reader.join();
            if thread::current().id() != subsystem.worker_thread {
                let _ = subsystem.worker.join();
            }
        }
    }
}

impl Drop for Initiator {
    fn drop(&mut self) {
        self.close();
    }
}
