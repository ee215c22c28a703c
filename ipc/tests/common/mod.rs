//! Shared test helpers for integration tests.
//!
//! Connectors hand out one half of a `UnixStream::pair()` per connection
//! and feed the other half to a thread playing the host: either a real
//! [`HostServer`] over a [`MemHost`], or a script of canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quarry_hostapi::{MemHost, MemHostConfig};
use quarry_ipc::codec::{read_message, write_message};
use quarry_ipc::{
    Connector, HostServer, IpcError, ProxyConfig, ProxyHost, Request, Response, ServerConfig,
    DEFAULT_MAX_MESSAGE_SIZE,
};
use quarry_primitives::{Address, PublicKey, PublicKeyValue, SignatureAlgorithm, UFix64};

/// Service account: funded in every served host.
pub const SERVICE: Address = Address::from_u64(0xf8d6_e058_6b0a_20c7);

/// First address handed out by `create_account` in served hosts.
pub const FIRST_CREATED: Address = Address::from_u64(0x01cf_0e2f_2f71_5450);

pub const CONTRACT_PLAIN: &str = "access(all) contract Hello {\n    access(all) let greeting: String\n    init() { self.greeting = \"Hello, World!\" }\n}\n";

pub const CONTRACT_WITH_ENUM: &str = "access(all) contract Colors {\n    access(all) enum Color: UInt8 {\n        access(all) case red\n        access(all) case green\n    }\n}\n";

// ── Connectors ──

/// Hands the far end of each new connection to a host thread.
pub struct PairConnector {
    streams: Sender<UnixStream>,
    connects: Arc<AtomicUsize>,
}

impl Connector for PairConnector {
    type Stream = UnixStream;

    fn connect(&self, io_timeout: Option<Duration>) -> Result<UnixStream, IpcError> {
        let (near, far) = UnixStream::pair()?;
        near.set_read_timeout(io_timeout)?;
        near.set_write_timeout(io_timeout)?;
        self.streams
            .send(far)
            .map_err(|_| IpcError::Io(std::io::Error::other("host thread has exited")))?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(near)
    }
}

// ── Served MemHost ──

/// A [`MemHost`] served on its own thread.
pub struct ServedHost {
    connects: Arc<AtomicUsize>,
    thread: JoinHandle<MemHost>,
}

impl ServedHost {
    /// Connections opened so far.
    pub fn connections(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Wait for the host thread and take back its state. Every proxy using
    /// the connector must have been dropped first.
    pub fn finish(self) -> MemHost {
        self.thread.join().expect("host thread panicked")
    }
}

/// Serve `host` and return a proxy talking to it.
pub fn serve(host: MemHost, config: ProxyConfig) -> (ProxyHost<PairConnector>, ServedHost) {
    let (tx, rx) = mpsc::channel::<UnixStream>();
    let connects = Arc::new(AtomicUsize::new(0));
    let thread = thread::spawn(move || {
        let server = HostServer::new(host, ServerConfig::default());
        server
            .serve_listener(rx.into_iter().map(Ok::<_, std::io::Error>))
            .expect("serve connections");
        server.into_host()
    });
    let connector = PairConnector {
        streams: tx,
        connects: Arc::clone(&connects),
    };
    (ProxyHost::new(connector, config), ServedHost { connects, thread })
}

/// In-memory host with the service account funded with 1000.0.
pub fn funded_host() -> MemHost {
    let config = MemHostConfig {
        first_address: FIRST_CREATED,
        default_balance: UFix64::from_raw(1_000_000),
        ..MemHostConfig::default()
    };
    MemHost::new(config).with_account(SERVICE, UFix64::from_raw(1_000 * 100_000_000))
}

// ── Scripted host ──

/// A fake host answering from a fixed list of responses and recording
/// every request it reads.
pub struct Script {
    requests: Arc<Mutex<Vec<Request>>>,
    connects: Arc<AtomicUsize>,
    thread: JoinHandle<()>,
}

impl Script {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn connections(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Wait for the script thread. Every proxy using the connector must
    /// have been dropped first.
    pub fn finish(self) -> Vec<Request> {
        self.thread.join().expect("script thread panicked");
        self.requests.lock().expect("requests lock").clone()
    }
}

/// Answer the n-th request with `responses[n]`, across connections. Once
/// the script runs out, the connection is closed without an answer.
pub fn script(responses: Vec<Response>, config: ProxyConfig) -> (ProxyHost<PairConnector>, Script) {
    let (tx, rx) = mpsc::channel::<UnixStream>();
    let connects = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let thread = thread::spawn(move || {
        let mut responses = VecDeque::from(responses);
        for mut stream in rx {
            loop {
                let request: Request = match read_message(&mut stream, DEFAULT_MAX_MESSAGE_SIZE) {
                    Ok(Some(request)) => request,
                    Ok(None) | Err(_) => break,
                };
                recorded.lock().expect("requests lock").push(request);
                let Some(response) = responses.pop_front() else {
                    break;
                };
                if write_message(&mut stream, &response, DEFAULT_MAX_MESSAGE_SIZE).is_err() {
                    break;
                }
            }
        }
    });
    let connector = PairConnector {
        streams: tx,
        connects: Arc::clone(&connects),
    };
    (
        ProxyHost::new(connector, config),
        Script {
            requests,
            connects,
            thread,
        },
    )
}

// ── Values ──

/// A 64-byte ECDSA P-256 public key filled with `seed`.
pub fn ecdsa_key(seed: u8) -> PublicKeyValue {
    PublicKeyValue::assume_validated(PublicKey::new(vec![seed; 64], SignatureAlgorithm::EcdsaP256))
}

/// Weight 1000.0, the full signing weight.
pub fn full_weight() -> UFix64 {
    UFix64::from_raw(1_000 * 100_000_000)
}
