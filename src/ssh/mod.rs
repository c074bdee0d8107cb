use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use crate::app::remote_fs::RemoteFs;
use crate::error::ConnectError;
use crate::model::{Endpoint, RemoteEntry};
use crate::ssh::keys::Credential;
use crate::ssh::known_hosts::{HostKeyVerdict, HostVerifier};

pub(crate) mod command;
pub(crate) mod keys;
pub(crate) mod known_hosts;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// An authenticated SSH transport with its SFTP subsystem open.
pub(crate) struct Session {
    transport: ssh2::Session,
    sftp: ssh2::Sftp,
}

impl Session {
    /// The raw transport, for opening command channels.
    pub(crate) fn transport(&self) -> &ssh2::Session {
        &self.transport
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.transport.disconnect(None, "closing", None);
    }
}

impl RemoteFs for Session {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteEntry>> {
        self.sftp.list_dir(path)
    }

    fn realpath(&self, path: &str) -> io::Result<String> {
        RemoteFs::realpath(&self.sftp, path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        RemoteFs::open(&self.sftp, path)
    }
}

/// Session setup steps that follow the SSH handshake.
pub(crate) trait EstablishedTransport {
    type Sftp;

    fn host_key_blob(&self) -> Option<Vec<u8>>;
    fn authenticate(&self, user: &str, private_key_pem: &str) -> Result<(), String>;
    fn open_sftp(&self) -> Result<Self::Sftp, String>;
    fn close(&self, reason: &str);
}

impl EstablishedTransport for ssh2::Session {
    type Sftp = ssh2::Sftp;

    fn host_key_blob(&self) -> Option<Vec<u8>> {
        self.host_key().map(|(blob, _)| blob.to_vec())
    }

    fn authenticate(&self, user: &str, private_key_pem: &str) -> Result<(), String> {
        self.userauth_pubkey_memory(user, None, private_key_pem, None)
            .map_err(|err| err.to_string())?;
        if !self.authenticated() {
            return Err("server did not accept the key".to_string());
        }
        Ok(())
    }

    fn open_sftp(&self) -> Result<ssh2::Sftp, String> {
        self.sftp().map_err(|err| err.to_string())
    }

    fn close(&self, reason: &str) {
        let _ = self.disconnect(None, reason, None);
    }
}

/// Dials `endpoint`, checks its host key against `verifier`, then authenticates with `credential`.
pub(crate) fn connect(
    endpoint: &Endpoint,
    credential: &Credential,
    verifier: &HostVerifier,
) -> Result<Session, ConnectError> {
    let address = endpoint.address();
    let dial = |reason: String| ConnectError::Dial {
        address: address.clone(),
        reason,
    };

    let tcp = dial_tcp(&address).map_err(|err| dial(err.to_string()))?;
    tcp.set_read_timeout(Some(CONNECT_TIMEOUT)).ok();
    tcp.set_write_timeout(Some(CONNECT_TIMEOUT)).ok();

    let mut transport = ssh2::Session::new().map_err(|err| dial(err.to_string()))?;
    transport.set_timeout(CONNECT_TIMEOUT.as_millis() as u32);
    transport.set_tcp_stream(tcp);
    transport
        .handshake()
        .map_err(|err| dial(format!("ssh handshake: {err}")))?;

    let sftp = establish(&transport, endpoint, credential.private_key_pem(), verifier)?;
    transport.set_timeout(IO_TIMEOUT.as_millis() as u32);

    Ok(Session { transport, sftp })
}

/// Host key check, authentication and SFTP on a handshaken transport.
///
/// The host key is checked before any authentication is attempted, so no
/// credential ever reaches an untrusted server. Every failure closes the
/// transport.
fn establish<T: EstablishedTransport>(
    transport: &T,
    endpoint: &Endpoint,
    private_key_pem: &str,
    verifier: &HostVerifier,
) -> Result<T::Sftp, ConnectError> {
    let Some(blob) = transport.host_key_blob() else {
        transport.close("no host key");
        return Err(ConnectError::Dial {
            address: endpoint.address(),
            reason: "server presented no host key".to_string(),
        });
    };
    if let HostKeyVerdict::Reject(reason) = verifier.verify(&endpoint.host, endpoint.port, &blob) {
        transport.close("host key rejected");
        return Err(ConnectError::HostKeyRejected {
            host: endpoint.host.clone(),
            reason,
        });
    }

    if let Err(reason) = transport.authenticate(&endpoint.user, private_key_pem) {
        transport.close("authentication failed");
        return Err(ConnectError::Auth {
            user: endpoint.user.clone(),
            reason,
        });
    }

    transport.open_sftp().map_err(|reason| {
        transport.close("sftp unavailable");
        ConnectError::SubsessionFailed(reason)
    })
}

fn dial_tcp(address: &str) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "address did not resolve")))
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_uses_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde("~/.ssh/id_rsa"), home.join(".ssh/id_rsa"));
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(expand_tilde("rel/~/x"), PathBuf::from("rel/~/x"));
    }

    use std::cell::RefCell;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as Base64;

    use crate::ssh::known_hosts::RejectReason;

    const KNOWN_HOSTS: &str = include_str!("../../tests/fixtures/known_hosts");
    const TRUSTED_KEY_B64: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIHlIkhWyFVgJv2WRMRlyRYsEUZW+fVd1qywD9/5pk00W";
    const OTHER_KEY_B64: &str = "AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBKh66DaMFVqJp3wdL6tuhTSVNYq+W6q0DoS6r6t5F92otWk3fpHsYshlcnvAiXYktNeUzmur4KB6tiO2IN00/Zg=";

    /// Records every call so tests can check what reached the server.
    struct MockTransport {
        host_key: Option<Vec<u8>>,
        auth_result: Result<(), String>,
        sftp_result: Result<(), String>,
        calls: RefCell<Vec<String>>,
    }

    impl MockTransport {
        fn presenting(key_b64: &str) -> Self {
            Self {
                host_key: Some(Base64.decode(key_b64).unwrap()),
                auth_result: Ok(()),
                sftp_result: Ok(()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl EstablishedTransport for MockTransport {
        type Sftp = ();

        fn host_key_blob(&self) -> Option<Vec<u8>> {
            self.host_key.clone()
        }

        fn authenticate(&self, user: &str, _private_key_pem: &str) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("auth {user}"));
            self.auth_result.clone()
        }

        fn open_sftp(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("sftp".to_string());
            self.sftp_result.clone()
        }

        fn close(&self, reason: &str) {
            self.calls.borrow_mut().push(format!("close: {reason}"));
        }
    }

    fn endpoint() -> Endpoint {
        Endpoint {
            user: "alice".to_string(),
            host: "example.com".to_string(),
            port: 22,
        }
    }

    #[test]
    fn trusted_host_authenticates_and_opens_sftp() {
        let verifier = HostVerifier::parse(KNOWN_HOSTS).unwrap();
        let transport = MockTransport::presenting(TRUSTED_KEY_B64);
        assert!(establish(&transport, &endpoint(), "key", &verifier).is_ok());
        assert_eq!(transport.calls(), vec!["auth alice", "sftp"]);
    }

    #[test]
    fn rejected_host_key_closes_before_authentication() {
        let verifier = HostVerifier::parse(KNOWN_HOSTS).unwrap();
        let transport = MockTransport::presenting(OTHER_KEY_B64);
        match establish(&transport, &endpoint(), "key", &verifier) {
            Err(ConnectError::HostKeyRejected { host, reason }) => {
                assert_eq!(host, "example.com");
                assert!(matches!(reason, RejectReason::Mismatch { .. }));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(transport.calls(), vec!["close: host key rejected"]);
    }

    #[test]
    fn unknown_host_is_rejected() {
        let verifier = HostVerifier::parse("").unwrap();
        let transport = MockTransport::presenting(TRUSTED_KEY_B64);
        assert!(matches!(
            establish(&transport, &endpoint(), "key", &verifier),
            Err(ConnectError::HostKeyRejected {
                reason: RejectReason::UnknownHost { .. },
                ..
            })
        ));
        assert_eq!(transport.calls(), vec!["close: host key rejected"]);
    }

    #[test]
    fn refused_key_is_auth_error() {
        let verifier = HostVerifier::parse(KNOWN_HOSTS).unwrap();
        let mut transport = MockTransport::presenting(TRUSTED_KEY_B64);
        transport.auth_result = Err("server did not accept the key".to_string());
        assert!(matches!(
            establish(&transport, &endpoint(), "key", &verifier),
            Err(ConnectError::Auth { ref user, .. }) if user == "alice"
        ));
        assert_eq!(transport.calls(), vec!["auth alice", "close: authentication failed"]);
    }

    #[test]
    fn missing_sftp_subsystem_closes_transport() {
        let verifier = HostVerifier::parse(KNOWN_HOSTS).unwrap();
        let mut transport = MockTransport::presenting(TRUSTED_KEY_B64);
        transport.sftp_result = Err("subsystem request failed".to_string());
        match establish(&transport, &endpoint(), "key", &verifier) {
            Err(ConnectError::SubsessionFailed(reason)) => {
                assert_eq!(reason, "subsystem request failed");
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(
            transport.calls(),
            vec!["auth alice", "sftp", "close: sftp unavailable"]
        );
    }

    #[test]
    fn connect_to_closed_port_is_dial_error() {
        let credential =
            keys::load(include_bytes!("../../tests/fixtures/keys/ed25519_plain.key"), "").unwrap();
        let verifier = HostVerifier::parse("").unwrap();
        let endpoint = Endpoint {
            user: "nobody".to_string(),
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        match connect(&endpoint, &credential, &verifier) {
            Err(ConnectError::Dial { address, .. }) => assert_eq!(address, "127.0.0.1:1"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
