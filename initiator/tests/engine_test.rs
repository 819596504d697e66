use crate::helper::*;
use common::{
    constants::{ops, rsp},
    messages::{
        device::DeviceInfo,
        ptpip::{Data, EndData, Event, StartData},
        to_bytes,
        PtpIpMessage,
    },
};
use initiator::{Initiator, InitiatorError};

#[test]
fn test_handshake() {
    let (addr, handle) = start_responder(|mut command, _event| {
        // Hold both connections until the client closes.
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    assert_eq!(initiator.responder().connection_number, CONNECTION_NUMBER);
    assert_eq!(initiator.responder().guid, RESPONDER_GUID);
    assert_eq!(initiator.responder().name, "responder");
    assert_eq!(initiator.session_id(), 0);

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_handshake_rejected() {
    let (addr, handle) = start_rejecting_responder(0x0000_0201);

    let error = Initiator::connect(addr, CLIENT_GUID, "test").unwrap_err();
    assert!(matches!(
        error,
        InitiatorError::HandshakeRejected {
            reason: 0x0000_0201,
        }
    ));
    handle.join().unwrap();
}

#[test]
fn test_session_lifecycle() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::OPEN_SESSION);
        assert_eq!(request.transaction_id, 0);
        assert_eq!(request.params[0], 42);
        send_ok(&mut command, request.transaction_id);

        let request = expect_operation(&mut command, ops::CLOSE_SESSION);
        assert_eq!(request.transaction_id, 1);
        send_ok(&mut command, request.transaction_id);

        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();

    assert!(matches!(
        initiator.open_session(0).unwrap_err(),
        InitiatorError::InvalidSessionId
    ));

    initiator.open_session(42).unwrap();
    assert_eq!(initiator.session_id(), 42);

    initiator.close_session().unwrap();
    assert_eq!(initiator.session_id(), 0);

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_non_ok_response_is_operation_error() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::INITIATE_CAPTURE);
        send_response(&mut command, rsp::DEVICE_BUSY, request.transaction_id);
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    let error = initiator.initiate_capture().unwrap_err();
    assert!(matches!(
        error,
        InitiatorError::Operation {
            code: rsp::DEVICE_BUSY,
        }
    ));
    assert_eq!(error.response_code(), Some(rsp::DEVICE_BUSY));

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_receive_data_tolerates_fragments() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::GET_DEVICE_PROP_VALUE);
        assert_eq!(request.params[0], 0x5001);

        let transaction_id = request.transaction_id;
        write_message(
            &mut command,
            StartData {
                transaction_id,
                total_length: 8,
            },
        );
        write_message(
            &mut command,
            Data {
                transaction_id,
                payload: vec![0x00, 0x01, 0x02, 0x03],
            },
        );
        write_message(
            &mut command,
            EndData {
                transaction_id,
                payload: vec![0x04, 0x05, 0x06, 0x07],
            },
        );
        send_ok(&mut command, transaction_id);

        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    let data = initiator.get_device_prop_value(0x5001).unwrap();
    assert_eq!(data, [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_send_data_single_end_data() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::OPEN_SESSION);
        send_ok(&mut command, request.transaction_id);

        let request = expect_operation(&mut command, ops::SET_DEVICE_PROP_VALUE);
        assert_eq!(request.transaction_id, 1);
        assert_eq!(request.params[0], 0x5001);

        match read_message(&mut command) {
            PtpIpMessage::StartData(start) => {
                assert_eq!(start.transaction_id, 2);
                assert_eq!(start.total_length, 2);
            }
            other => panic!("expected StartData, got {}", other.name()),
        }
        // The send side never splits: the whole payload rides one EndData.
        match read_message(&mut command) {
            PtpIpMessage::EndData(end) => {
                assert_eq!(end.transaction_id, 2);
                assert_eq!(end.payload, [0x12, 0x34]);
            }
            other => panic!("expected EndData, got {}", other.name()),
        }
        send_ok(&mut command, 1);

        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    initiator.open_session(7).unwrap();
    initiator.set_device_prop_value(0x5001, &[0x12, 0x34]).unwrap();

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_get_device_info() {
    let info = DeviceInfo {
        standard_version: 100,
        manufacturer: "ACME".to_owned(),
        model: "NetCam 9000".to_owned(),
        operations_supported: vec![ops::GET_DEVICE_INFO, ops::OPEN_SESSION],
        ..DeviceInfo::default()
    };
    let encoded = to_bytes(&info).unwrap();

    let (addr, handle) = start_responder(move |mut command, _event| {
        let request = expect_operation(&mut command, ops::GET_DEVICE_INFO);
        write_message(
            &mut command,
            StartData {
                transaction_id: request.transaction_id,
                total_length: encoded.len() as u64,
            },
        );
        write_message(
            &mut command,
            EndData {
                transaction_id: request.transaction_id,
                payload: encoded,
            },
        );
        send_ok(&mut command, request.transaction_id);

        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    let decoded = initiator.get_device_info().unwrap();
    assert_eq!(decoded.manufacturer, "ACME");
    assert_eq!(decoded.model, "NetCam 9000");
    assert!(decoded.supports_operation(ops::OPEN_SESSION));

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_typed_prop_roundtrip() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::GET_DEVICE_PROP_VALUE);
        write_message(
            &mut command,
            StartData {
                transaction_id: request.transaction_id,
                total_length: 2,
            },
        );
        write_message(
            &mut command,
            EndData {
                transaction_id: request.transaction_id,
                payload: vec![0x64, 0x00],
            },
        );
        send_ok(&mut command, request.transaction_id);

        let request = expect_operation(&mut command, ops::SET_DEVICE_PROP_VALUE);
        match read_message(&mut command) {
            PtpIpMessage::StartData(_) => {}
            other => panic!("expected StartData, got {}", other.name()),
        }
        match read_message(&mut command) {
            PtpIpMessage::EndData(end) => assert_eq!(end.payload, [0xC8, 0x00]),
            other => panic!("expected EndData, got {}", other.name()),
        }
        send_ok(&mut command, request.transaction_id);

        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    assert_eq!(initiator.get_device_prop_u16(0x500D).unwrap(), 100);
    initiator.set_device_prop(0x500D, &200u16).unwrap();

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_ok_response_where_data_expected() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::GET_DEVICE_PROP_VALUE);
        send_ok(&mut command, request.transaction_id);
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    let error = initiator.get_device_prop_value(0x5001).unwrap_err();
    assert!(matches!(
        error,
        InitiatorError::UnexpectedPacket {
            expected: "StartData",
            actual: "OperationResponse",
        }
    ));

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_error_response_where_data_expected() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let request = expect_operation(&mut command, ops::GET_DEVICE_PROP_VALUE);
        send_response(
            &mut command,
            rsp::DEVICE_PROP_NOT_SUPPORTED,
            request.transaction_id,
        );
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    let error = initiator.get_device_prop_value(0x5001).unwrap_err();
    assert!(matches!(
        error,
        InitiatorError::Operation {
            code: rsp::DEVICE_PROP_NOT_SUPPORTED,
        }
    ));

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_unexpected_packet_where_response_expected() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let _ = expect_operation(&mut command, ops::INITIATE_CAPTURE);
        // A desynchronized responder answers with an Event on the
        // command-data connection.
        write_message(
            &mut command,
            Event {
                event_code: 0x4002,
                transaction_id: 0,
                params: [0; 3],
            },
        );
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    initiator.send_operation(ops::INITIATE_CAPTURE, &[]).unwrap();
    let error = initiator.receive_response().unwrap_err();
    assert!(matches!(
        error,
        InitiatorError::UnexpectedPacket {
            expected: "OperationResponse",
            actual: "Event",
        }
    ));

    initiator.close();
    handle.join().unwrap();
}

#[test]
fn test_too_many_parameters() {
    let (addr, handle) = start_responder(|mut command, _event| {
        let _ = PtpIpMessage::read_from(&mut command);
    });

    let mut initiator = Initiator::connect(addr, CLIENT_GUID, "test").unwrap();
    assert!(matches!(
        initiator
            .send_operation(ops::OPEN_SESSION, &[1, 2, 3, 4, 5, 6])
            .unwrap_err(),
        InitiatorError::TooManyParameters(6)
    ));

    initiator.close();
    handle.join().unwrap();
}
