use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ssh::known_hosts::RejectReason;

/// Private key loading errors
#[derive(Error, Debug)]
pub(crate) enum KeyError {
    #[error("Cannot read key file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        source: io::Error,
    },

    #[error("No PEM envelope found, not a private key file")]
    MalformedEnvelope,

    #[error("Decrypting key failed: {0}")]
    DecryptionFailed(String),

    #[error("Unsupported key type {0:?}")]
    UnsupportedType(String),

    #[error("Parsing {block} failed: {reason}")]
    Decode {
        block: &'static str,
        reason: String,
    },

    #[error("Creating signer from key failed: {0}")]
    SignerConstructionFailed(String),
}

/// Known hosts registry errors
#[derive(Error, Debug)]
pub(crate) enum TrustError {
    #[error("Cannot read known hosts file '{path}': {reason}")]
    RegistryUnreadable { path: PathBuf, reason: String },

    #[error("Known hosts line {line} is malformed: {reason}")]
    MalformedEntry { line: usize, reason: String },
}

/// Connection setup errors
#[derive(Error, Debug)]
pub(crate) enum ConnectError {
    #[error("Connection to {address} failed: {reason}")]
    Dial { address: String, reason: String },

    #[error("Authentication as {user} failed: {reason}")]
    Auth { user: String, reason: String },

    #[error("Host key for {host} rejected: {reason}")]
    HostKeyRejected { host: String, reason: RejectReason },

    #[error("Opening SFTP subsystem failed: {0}")]
    SubsessionFailed(String),
}

/// Remote command errors
#[derive(Error, Debug)]
pub(crate) enum CommandError {
    #[error("Command channel failed: {0}")]
    Channel(#[from] io::Error),

    #[error("Command exited with status {0}")]
    NonZeroExit(i32, String),
}

/// Directory navigation errors
#[derive(Error, Debug)]
pub(crate) enum NavError {
    #[error("Listing {path} failed: {source}")]
    ListFailed { path: String, source: io::Error },
}

/// Download errors
#[derive(Error, Debug)]
pub(crate) enum DownloadError {
    #[error("Opening remote file {path} failed: {source}")]
    OpenRemote { path: String, source: io::Error },

    #[error("Creating local file '{path}' failed: {source}")]
    CreateLocal { path: PathBuf, source: io::Error },

    #[error("Copying to '{path}' failed after {bytes_written} bytes: {source}")]
    CopyFailed {
        path: PathBuf,
        bytes_written: u64,
        source: io::Error,
    },
}
