use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use kdcprims_protocol::{Controller, MotorType, StageType};
use kdcprims_transport::{TcpConfig, TcpTransport};

/// Minimal stand-in for a controller behind a serial-over-TCP bridge.
fn spawn_device(listener: TcpListener) -> thread::JoinHandle<Vec<[u8; 6]>> {
    thread::spawn(move || {
        let (mut conn, _) = listener.accept().expect("client should connect");
        let mut seen = Vec::new();
        let mut request = [0u8; 6];
        while conn.read_exact(&mut request).is_ok() {
            seen.push(request);
            match u16::from_le_bytes([request[0], request[1]]) {
                0x0211 => {
                    conn.write_all(&[0x12, 0x02, 0x01, 0x01, 0x01, 0x50]).unwrap();
                }
                0x0490 => {
                    let mut reply = vec![0x91, 0x04, 0x0E, 0x00, 0x81, 0x50, 0x01, 0x00];
                    reply.extend_from_slice(&345_550i32.to_le_bytes());
                    reply.extend_from_slice(&0u16.to_le_bytes());
                    reply.extend_from_slice(&0i16.to_le_bytes());
                    reply.extend_from_slice(&0x8000_0500u32.to_le_bytes());
                    conn.write_all(&reply).unwrap();
                }
                _ => {}
            }
        }
        seen
    })
}

#[test]
fn controller_over_tcp_bridge() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let device = spawn_device(listener);

    let transport = TcpTransport::new(TcpConfig::new(addr.to_string()));
    let mut ctl = Controller::new(transport, StageType::Mts25Z8, MotorType::Brushed);
    ctl.connect().expect("bridge should accept");

    assert!(ctl.is_enabled(1).unwrap());
    ctl.start_home_move(1).unwrap();
    let status = ctl.get_dc_status_update_si(1).unwrap();
    assert!(status.status.is_homed);
    assert!((status.position - 10.0).abs() < 1e-4);

    ctl.disconnect().unwrap();
    let seen = device.join().unwrap();
    let ids: Vec<u16> = seen
        .iter()
        .map(|r| u16::from_le_bytes([r[0], r[1]]))
        .collect();
    assert_eq!(ids, vec![0x0211, 0x0443, 0x0490]);
}
