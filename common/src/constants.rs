//! Code tables from the PTP standard and the PTP-IP transport mapping.

/// Protocol version advertised in `InitCommandRequest`/`InitCommandAck`.
pub const PTPIP_VERSION: u32 = 0x0001_0000;

/// `0xFFFF_FFFF` is reserved by the standard and never allocated by the
/// transaction sequencer.
pub const RESERVED_TRANSACTION_ID: u32 = 0xFFFF_FFFF;

/// The only `data_phase_info` value this initiator emits.
pub const DATA_PHASE_INFO: u32 = 1;

/// A session id of 0 means "no session open".
pub const NO_SESSION: u32 = 0;

pub mod ops {
    pub const GET_DEVICE_INFO: u16 = 0x1001;
    pub const OPEN_SESSION: u16 = 0x1002;
    pub const CLOSE_SESSION: u16 = 0x1003;
    pub const GET_STORAGE_IDS: u16 = 0x1004;
    pub const GET_STORAGE_INFO: u16 = 0x1005;
    pub const GET_NUM_OBJECTS: u16 = 0x1006;
    pub const GET_OBJECT_HANDLES: u16 = 0x1007;
    pub const GET_OBJECT_INFO: u16 = 0x1008;
    pub const GET_OBJECT: u16 = 0x1009;
    pub const GET_THUMB: u16 = 0x100A;
    pub const INITIATE_CAPTURE: u16 = 0x100E;
    pub const GET_DEVICE_PROP_DESC: u16 = 0x1014;
    pub const GET_DEVICE_PROP_VALUE: u16 = 0x1015;
    pub const SET_DEVICE_PROP_VALUE: u16 = 0x1016;
    pub const TERMINATE_OPEN_CAPTURE: u16 = 0x1018;
    pub const GET_PARTIAL_OBJECT: u16 = 0x101B;
    pub const INITIATE_OPEN_CAPTURE: u16 = 0x101C;
}

pub mod rsp {
    pub const UNDEFINED: u16 = 0x2000;
    pub const OK: u16 = 0x2001;
    pub const GENERAL_ERROR: u16 = 0x2002;
    pub const SESSION_NOT_OPEN: u16 = 0x2003;
    pub const INVALID_TRANSACTION_ID: u16 = 0x2004;
    pub const OPERATION_NOT_SUPPORTED: u16 = 0x2005;
    pub const PARAMETER_NOT_SUPPORTED: u16 = 0x2006;
    pub const INCOMPLETE_TRANSFER: u16 = 0x2007;
    pub const INVALID_STORAGE_ID: u16 = 0x2008;
    pub const INVALID_OBJECT_HANDLE: u16 = 0x2009;
    pub const DEVICE_PROP_NOT_SUPPORTED: u16 = 0x200A;
    pub const STORE_FULL: u16 = 0x200C;
    pub const ACCESS_DENIED: u16 = 0x200F;
    pub const SELF_TEST_FAILED: u16 = 0x2011;
    pub const STORE_NOT_AVAILABLE: u16 = 0x2013;
    pub const DEVICE_BUSY: u16 = 0x2019;
    pub const INVALID_DEVICE_PROP_FORMAT: u16 = 0x201B;
    pub const INVALID_DEVICE_PROP_VALUE: u16 = 0x201C;
    pub const INVALID_PARAMETER: u16 = 0x201D;
    pub const SESSION_ALREADY_OPEN: u16 = 0x201E;
    pub const TRANSACTION_CANCELLED: u16 = 0x201F;

    pub fn name(code: u16) -> Option<&'static str> {
        Some(match code {
            UNDEFINED => "Undefined",
            OK => "Ok",
            GENERAL_ERROR => "GeneralError",
            SESSION_NOT_OPEN => "SessionNotOpen",
            INVALID_TRANSACTION_ID => "InvalidTransactionId",
            OPERATION_NOT_SUPPORTED => "OperationNotSupported",
            PARAMETER_NOT_SUPPORTED => "ParameterNotSupported",
            INCOMPLETE_TRANSFER => "IncompleteTransfer",
            INVALID_STORAGE_ID => "InvalidStorageId",
            INVALID_OBJECT_HANDLE => "InvalidObjectHandle",
            DEVICE_PROP_NOT_SUPPORTED => "DevicePropNotSupported",
            STORE_FULL => "StoreFull",
            ACCESS_DENIED => "AccessDenied",
            SELF_TEST_FAILED => "SelfTestFailed",
            STORE_NOT_AVAILABLE => "StoreNotAvailable",
            DEVICE_BUSY => "DeviceBusy",
            INVALID_DEVICE_PROP_FORMAT => "InvalidDevicePropFormat",
            INVALID_DEVICE_PROP_VALUE => "InvalidDevicePropValue",
            INVALID_PARAMETER => "InvalidParameter",
            SESSION_ALREADY_OPEN => "SessionAlreadyOpen",
            TRANSACTION_CANCELLED => "TransactionCancelled",
            _ => return None,
        })
    }
}

pub mod events {
    pub const UNDEFINED: u16 = 0x4000;
    pub const CANCEL_TRANSACTION: u16 = 0x4001;
    pub const OBJECT_ADDED: u16 = 0x4002;
    pub const OBJECT_REMOVED: u16 = 0x4003;
    pub const STORE_ADDED: u16 = 0x4004;
    pub const STORE_REMOVED: u16 = 0x4005;
    pub const DEVICE_PROP_CHANGED: u16 = 0x4006;
    pub const OBJECT_INFO_CHANGED: u16 = 0x4007;
    pub const DEVICE_INFO_CHANGED: u16 = 0x4008;
    pub const REQUEST_OBJECT_TRANSFER: u16 = 0x4009;
    pub const STORE_FULL: u16 = 0x400A;
    pub const STORAGE_INFO_CHANGED: u16 = 0x400C;
    pub const CAPTURE_COMPLETE: u16 = 0x400D;
    pub const UNREPORTED_STATUS: u16 = 0x400E;
}
