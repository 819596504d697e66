//! PTP-IP packet layouts and framing.
//!
//! Every frame on the wire is `[u32 total_length][u32 packet_type][payload]`
//! with `total_length == 8 + payload.len()`. One struct per packet kind below,
//! gathered into [`PtpIpMessage`].

use super::{Error, MessageComponent};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Read, Write};

pub type Guid = [u8; 16];

/// Width of the `[total_length][packet_type]` frame header.
pub const FRAME_HEADER_WIDTH: usize = 8;

pub const TYPE_INIT_COMMAND_REQUEST: u32 = 1;
pub const TYPE_INIT_COMMAND_ACK: u32 = 2;
pub const TYPE_INIT_EVENT_REQUEST: u32 = 3;
pub const TYPE_INIT_EVENT_ACK: u32 = 4;
pub const TYPE_INIT_FAIL: u32 = 5;
pub const TYPE_OPERATION_REQUEST: u32 = 6;
pub const TYPE_OPERATION_RESPONSE: u32 = 7;
pub const TYPE_EVENT: u32 = 8;
pub const TYPE_START_DATA: u32 = 9;
pub const TYPE_DATA: u32 = 10;
pub const TYPE_CANCEL: u32 = 11;
pub const TYPE_END_DATA: u32 = 12;
// ProbeRequest and ProbeResponse share this tag.
pub const TYPE_PROBE: u32 = 13;

fn read_params<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u32; N], Error> {
    let mut params = [0u32; N];
    for param in &mut params {
        *param = u32::read(cursor)?;
    }
    Ok(params)
}

fn write_params<const N: usize>(
    params: &[u32; N],
    cursor: &mut Cursor<Vec<u8>>,
) -> Result<(), Error> {
    for param in params {
        param.write(cursor)?;
    }
    Ok(())
}

fn read_remaining(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::new();
    cursor.read_to_end(&mut payload).map_err(Error::from)?;
    Ok(payload)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommandRequest {
    pub guid: Guid,
    pub name: String,
    pub version: u32,
}

impl MessageComponent for InitCommandRequest {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            guid: Guid::read(cursor)?,
            name: String::read(cursor)?,
            version: u32::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.guid.write(cursor)?;
        self.name.write(cursor)?;
        self.version.write(cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCommandAck {
    pub connection_number: u32,
    pub guid: Guid,
    pub name: String,
    pub version: u32,
}

impl MessageComponent for InitCommandAck {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            connection_number: u32::read(cursor)?,
            guid: Guid::read(cursor)?,
            name: String::read(cursor)?,
            version: u32::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.connection_number.write(cursor)?;
        self.guid.write(cursor)?;
        self.name.write(cursor)?;
        self.version.write(cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitEventRequest {
    pub connection_number: u32,
}

impl MessageComponent for InitEventRequest {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            connection_number: u32::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.connection_number.write(cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitEventAck {}

impl MessageComponent for InitEventAck {
    fn read(_cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {})
    }

    fn write(&self, _cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitFail {
    pub reason: u32,
}

impl MessageComponent for InitFail {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            reason: u32::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.reason.write(cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRequest {
    pub data_phase_info: u32,
    pub operation_code: u16,
    pub transaction_id: u32,
    pub params: [u32; 5],
}

impl MessageComponent for OperationRequest {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            data_phase_info: u32::read(cursor)?,
            operation_code: u16::read(cursor)?,
            transaction_id: u32::read(cursor)?,
            params: read_params(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.data_phase_info.write(cursor)?;
        self.operation_code.write(cursor)?;
        self.transaction_id.write(cursor)?;
        write_params(&self.params, cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResponse {
    pub response_code: u16,
    pub transaction_id: u32,
    pub params: [u32; 5],
}

impl MessageComponent for OperationResponse {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            response_code: u16::read(cursor)?,
            transaction_id: u32::read(cursor)?,
            params: read_params(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.response_code.write(cursor)?;
        self.transaction_id.write(cursor)?;
        write_params(&self.params, cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub event_code: u16,
    pub transaction_id: u32,
    pub params: [u32; 3],
}

impl MessageComponent for Event {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            event_code: u16::read(cursor)?,
            transaction_id: u32::read(cursor)?,
            params: read_params(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.event_code.write(cursor)?;
        self.transaction_id.write(cursor)?;
        write_params(&self.params, cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartData {
    pub transaction_id: u32,
    pub total_length: u64,
}

impl MessageComponent for StartData {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            transaction_id: u32::read(cursor)?,
            total_length: u64::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.transaction_id.write(cursor)?;
        self.total_length.write(cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub transaction_id: u32,
    pub payload: Vec<u8>,
}

impl MessageComponent for Data {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            transaction_id: u32::read(cursor)?,
            payload: read_remaining(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.transaction_id.write(cursor)?;
        cursor.write_all(&self.payload).map_err(Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndData {
    pub transaction_id: u32,
    pub payload: Vec<u8>,
}

impl MessageComponent for EndData {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            transaction_id: u32::read(cursor)?,
            payload: read_remaining(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.transaction_id.write(cursor)?;
        cursor.write_all(&self.payload).map_err(Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancel {
    pub transaction_id: u32,
}

impl MessageComponent for Cancel {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {
            transaction_id: u32::read(cursor)?,
        })
    }

    fn write(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        self.transaction_id.write(cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRequest {}

impl MessageComponent for ProbeRequest {
    fn read(_cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {})
    }

    fn write(&self, _cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {}

impl MessageComponent for ProbeResponse {
    fn read(_cursor: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Ok(Self {})
    }

    fn write(&self, _cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtpIpMessage {
    InitCommandRequest(InitCommandRequest),
    InitCommandAck(InitCommandAck),
    InitEventRequest(InitEventRequest),
    InitEventAck(InitEventAck),
    InitFail(InitFail),
    OperationRequest(OperationRequest),
    OperationResponse(OperationResponse),
    Event(Event),
    StartData(StartData),
    Data(Data),
    EndData(EndData),
    Cancel(Cancel),
    ProbeRequest(ProbeRequest),
    ProbeResponse(ProbeResponse),
}

impl PtpIpMessage {
    pub fn packet_type(&self) -> u32 {
        match self {
            Self::InitCommandRequest(_) => TYPE_INIT_COMMAND_REQUEST,
            Self::InitCommandAck(_) => TYPE_INIT_COMMAND_ACK,
            Self::InitEventRequest(_) => TYPE_INIT_EVENT_REQUEST,
            Self::InitEventAck(_) => TYPE_INIT_EVENT_ACK,
            Self::InitFail(_) => TYPE_INIT_FAIL,
            Self::OperationRequest(_) => TYPE_OPERATION_REQUEST,
            Self::OperationResponse(_) => TYPE_OPERATION_RESPONSE,
            Self::Event(_) => TYPE_EVENT,
            Self::StartData(_) => TYPE_START_DATA,
            Self::Data(_) => TYPE_DATA,
            Self::EndData(_) => TYPE_END_DATA,
            Self::Cancel(_) => TYPE_CANCEL,
            Self::ProbeRequest(_) | Self::ProbeResponse(_) => TYPE_PROBE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitCommandRequest(_) => "InitCommandRequest",
            Self::InitCommandAck(_) => "InitCommandAck",
            Self::InitEventRequest(_) => "InitEventRequest",
            Self::InitEventAck(_) => "InitEventAck",
            Self::InitFail(_) => "InitFail",
            Self::OperationRequest(_) => "OperationRequest",
            Self::OperationResponse(_) => "OperationResponse",
            Self::Event(_) => "Event",
            Self::StartData(_) => "StartData",
            Self::Data(_) => "Data",
            Self::EndData(_) => "EndData",
            Self::Cancel(_) => "Cancel",
            Self::ProbeRequest(_) => "ProbeRequest",
            Self::ProbeResponse(_) => "ProbeResponse",
        }
    }

    fn write_payload(&self, cursor: &mut Cursor<Vec<u8>>) -> Result<(), Error> {
        match self {
            Self::InitCommandRequest(msg) => msg.write(cursor),
            Self::InitCommandAck(msg) => msg.write(cursor),
            Self::InitEventRequest(msg) => msg.write(cursor),
            Self::InitEventAck(msg) => msg.write(cursor),
            Self::InitFail(msg) => msg.write(cursor),
            Self::OperationRequest(msg) => msg.write(cursor),
            Self::OperationResponse(msg) => msg.write(cursor),
            Self::Event(msg) => msg.write(cursor),
            Self::StartData(msg) => msg.write(cursor),
            Self::Data(msg) => msg.write(cursor),
            Self::EndData(msg) => msg.write(cursor),
            Self::Cancel(msg) => msg.write(cursor),
            Self::ProbeRequest(msg) => msg.write(cursor),
            Self::ProbeResponse(msg) => msg.write(cursor),
        }
    }

    /// Encodes the complete frame, length field included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_u32::<LittleEndian>(0)?;
        cursor.write_u32::<LittleEndian>(self.packet_type())?;
        self.write_payload(&mut cursor)?;

        let mut bytes = cursor.into_inner();
        let total_length = u32::try_from(bytes.len())?;
        bytes[0 .. 4].copy_from_slice(&total_length.to_le_bytes());
        Ok(bytes)
    }

    pub fn write_to<W: Write>(&self, stream: &mut W) -> Result<(), Error> {
        let bytes = self.to_bytes()?;
        stream.write_all(&bytes).map_err(Error::StdIo)
    }

    /// Reads one whole frame and dispatches on its type tag. Buffering the
    /// frame before decoding is what lets callers branch on the type without
    /// a seekable stream. Inbound tag 13 decodes as [`ProbeRequest`]; only a
    /// responder ever sends probes.
    pub fn read_from<R: Read>(stream: &mut R) -> Result<Self, Error> {
        let mut header = [0u8; FRAME_HEADER_WIDTH];
        stream.read_exact(&mut header).map_err(Error::from)?;

        let total_length = u32::from_le_bytes(header[0 .. 4].try_into().unwrap());
        let packet_type = u32::from_le_bytes(header[4 .. 8].try_into().unwrap());
        if (total_length as usize) < FRAME_HEADER_WIDTH {
            return Err(Error::BadFrameLength(total_length));
        }

        let payload_length = total_length as usize - FRAME_HEADER_WIDTH;
        let mut payload = vec![0u8; payload_length];
        stream.read_exact(&mut payload).map_err(Error::from)?;

        let mut cursor = Cursor::new(payload.as_slice());
        let message = match packet_type {
            TYPE_INIT_COMMAND_REQUEST => {
                Self::InitCommandRequest(InitCommandRequest::read(&mut cursor)?)
            }
            TYPE_INIT_COMMAND_ACK => Self::InitCommandAck(InitCommandAck::read(&mut cursor)?),
            TYPE_INIT_EVENT_REQUEST => Self::InitEventRequest(InitEventRequest::read(&mut cursor)?),
            TYPE_INIT_EVENT_ACK => Self::InitEventAck(InitEventAck::read(&mut cursor)?),
            TYPE_INIT_FAIL => Self::InitFail(InitFail::read(&mut cursor)?),
            TYPE_OPERATION_REQUEST => Self::OperationRequest(OperationRequest::read(&mut cursor)?),
            TYPE_OPERATION_RESPONSE => {
                Self::OperationResponse(OperationResponse::read(&mut cursor)?)
            }
            TYPE_EVENT => Self::Event(Event::read(&mut cursor)?),
            TYPE_START_DATA => Self::StartData(StartData::read(&mut cursor)?),
            TYPE_DATA => Self::Data(Data::read(&mut cursor)?),
            TYPE_END_DATA => Self::EndData(EndData::read(&mut cursor)?),
            TYPE_CANCEL => Self::Cancel(Cancel::read(&mut cursor)?),
            TYPE_PROBE => Self::ProbeRequest(ProbeRequest::read(&mut cursor)?),
            packet_type => return Err(Error::BadPacketType(packet_type)),
        };

        // Fixed-size payloads must be consumed exactly; Data/EndData are
        // greedy and always are.
        let consumed = cursor.position() as usize;
        if consumed != payload_length {
            return Err(Error::BadPayloadLength {
                packet: message.name(),
                expected: consumed,
                actual: payload_length,
            });
        }

        Ok(message)
    }
}

macro_rules! impl_from_packet {
    ($variant:ident) => {
        impl From<$variant> for PtpIpMessage {
            fn from(msg: $variant) -> Self {
                Self::$variant(msg)
            }
        }
    };
}

impl_from_packet!(InitCommandRequest);
impl_from_packet!(InitCommandAck);
impl_from_packet!(InitEventRequest);
impl_from_packet!(InitEventAck);
impl_from_packet!(InitFail);
impl_from_packet!(OperationRequest);
impl_from_packet!(OperationResponse);
impl_from_packet!(Event);
impl_from_packet!(StartData);
impl_from_packet!(Data);
impl_from_packet!(EndData);
impl_from_packet!(Cancel);
impl_from_packet!(ProbeRequest);
impl_from_packet!(ProbeResponse);
