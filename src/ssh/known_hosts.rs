use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD as Base64, STANDARD_NO_PAD as Base64NoPad};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::TrustError;

const DEFAULT_SSH_PORT: u16 = 22;
const HASHED_PREFIX: &str = "|1|";

/// SHA-256 digest of an SSH public key blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub(crate) fn of_blob(blob: &[u8]) -> Self {
        Self(Sha256::digest(blob).into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256:{}", Base64NoPad.encode(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RejectReason {
    UnknownHost { presented: Fingerprint },
    Mismatch { expected: Fingerprint, presented: Fingerprint },
    Revoked { presented: Fingerprint },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHost { presented } => {
                write!(f, "host is not in known hosts (key {presented})")
            }
            Self::Mismatch {
                expected,
                presented,
            } => write!(f, "key changed: expected {expected}, got {presented}"),
            Self::Revoked { presented } => write!(f, "key {presented} is revoked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostKeyVerdict {
    Accept,
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Revoked,
    CertAuthority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostPatterns {
    Hashed { salt: Vec<u8>, hash: Vec<u8> },
    List(Vec<String>),
}

impl HostPatterns {
    fn parse(field: &str) -> Result<Self, String> {
        if let Some(rest) = field.strip_prefix(HASHED_PREFIX) {
            let (salt, hash) = rest
                .split_once('|')
                .ok_or_else(|| format!("malformed hashed host {field:?}"))?;
            let salt = Base64.decode(salt).map_err(|err| format!("bad salt: {err}"))?;
            let hash = Base64.decode(hash).map_err(|err| format!("bad hash: {err}"))?;
            return Ok(Self::Hashed { salt, hash });
        }
        let patterns: Vec<String> = field
            .split(',')
            .filter(|pattern| !pattern.is_empty())
            .map(str::to_lowercase)
            .collect();
        if patterns.is_empty() {
            return Err("empty host pattern".to_string());
        }
        Ok(Self::List(patterns))
    }

    fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Hashed { salt, hash } => {
                let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(salt) else {
                    return false;
                };
                mac.update(candidate.as_bytes());
                mac.verify_slice(hash).is_ok()
            }
            Self::List(patterns) => {
                let mut matched = false;
                for pattern in patterns {
                    if let Some(negated) = pattern.strip_prefix('!') {
                        if glob_match(negated, candidate) {
                            return false;
                        }
                    } else if glob_match(pattern, candidate) {
                        matched = true;
                    }
                }
                matched
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrustedHost {
    marker: Option<Marker>,
    patterns: HostPatterns,
    key_type: String,
    fingerprint: Fingerprint,
}

/// Host key checks against an OpenSSH known_hosts registry.
#[derive(Debug, Clone, Default)]
pub(crate) struct HostVerifier {
    entries: Vec<TrustedHost>,
}

impl HostVerifier {
    pub(crate) fn load(path: &Path) -> Result<Self, TrustError> {
        let unreadable = |reason: String| TrustError::RegistryUnreadable {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|err| unreadable(err.to_string()))?;
        Self::parse(&content)
    }

    pub(crate) fn parse(content: &str) -> Result<Self, TrustError> {
        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_line(line).map_err(|reason| TrustError::MalformedEntry {
                line: index + 1,
                reason,
            })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks the key blob a server presented for `host:port`.
    pub(crate) fn verify(&self, host: &str, port: u16, key_blob: &[u8]) -> HostKeyVerdict {
        let candidate = host_candidate(host, port);
        let presented = Fingerprint::of_blob(key_blob);
        let matching: Vec<&TrustedHost> = self
            .entries
            .iter()
            .filter(|entry| entry.marker != Some(Marker::CertAuthority))
            .filter(|entry| entry.patterns.matches(&candidate))
            .collect();

        if matching
            .iter()
            .any(|entry| entry.marker == Some(Marker::Revoked) && entry.fingerprint == presented)
        {
            return HostKeyVerdict::Reject(RejectReason::Revoked { presented });
        }
        let trusted: Vec<&&TrustedHost> = matching
            .iter()
            .filter(|entry| entry.marker.is_none())
            .collect();
        if trusted.iter().any(|entry| entry.fingerprint == presented) {
            return HostKeyVerdict::Accept;
        }
        let presented_type = blob_key_type(key_blob);
        let expected = trusted
            .iter()
            .find(|entry| Some(entry.key_type.as_str()) == presented_type.as_deref())
            .or_else(|| trusted.first());
        match expected {
            Some(entry) => HostKeyVerdict::Reject(RejectReason::Mismatch {
                expected: entry.fingerprint,
                presented,
            }),
            None => HostKeyVerdict::Reject(RejectReason::UnknownHost { presented }),
        }
    }
}

fn parse_line(line: &str) -> Result<TrustedHost, String> {
    let mut fields = line.split_whitespace();
    let first = fields.next().ok_or("empty line")?;
    let (marker, hosts) = if let Some(marker) = first.strip_prefix('@') {
        let marker = match marker {
            "revoked" => Marker::Revoked,
            "cert-authority" => Marker::CertAuthority,
            other => return Err(format!("unknown marker @{other}")),
        };
        (Some(marker), fields.next().ok_or("missing host patterns")?)
    } else {
        (None, first)
    };
    let key_type = fields.next().ok_or("missing key type")?;
    let encoded = fields.next().ok_or("missing key data")?;
    let blob = Base64
        .decode(encoded)
        .map_err(|err| format!("bad key data: {err}"))?;
    if let Some(embedded) = blob_key_type(&blob) {
        if embedded != key_type {
            return Err(format!("key type {key_type} does not match key data ({embedded})"));
        }
    } else {
        return Err("truncated key data".to_string());
    }
    Ok(TrustedHost {
        marker,
        patterns: HostPatterns::parse(hosts)?,
        key_type: key_type.to_string(),
        fingerprint: Fingerprint::of_blob(&blob),
    })
}

/// Name known_hosts uses for a host: bare for port 22, `[host]:port` otherwise.
fn host_candidate(host: &str, port: u16) -> String {
    let host = host.to_lowercase();
    if port == DEFAULT_SSH_PORT {
        host
    } else {
        format!("[{host}]:{port}")
    }
}

/// Reads the leading algorithm string of an SSH wire-format key blob.
fn blob_key_type(blob: &[u8]) -> Option<String> {
    let len_bytes: [u8; 4] = blob.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let name = blob.get(4..4usize.checked_add(len)?)?;
    String::from_utf8(name.to_vec()).ok()
}

/// OpenSSH-style wildcard match: `*` any run, `?` any single character.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    let (mut p, mut c) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while c < candidate.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == candidate[c]) {
            p += 1;
            c += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, c));
            p += 1;
        } else if let Some((star_p, star_c)) = star {
            p = star_p + 1;
            c = star_c + 1;
            star = Some((star_p, star_c + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}
