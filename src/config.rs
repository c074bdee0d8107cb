use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use serde::Deserialize;

use crate::model::Endpoint;
use crate::ssh::expand_tilde;

const APP_DIR: &str = "sftp-browse";
const DEFAULT_PORT: u16 = 22;
const DEFAULT_KEY_PATH: &str = "~/.ssh/id_rsa";
const DEFAULT_KNOWN_HOSTS: &str = "~/.ssh/known_hosts";
const PASSPHRASE_ENV: &str = "SFTPB_PASSPHRASE";

/// Browse and download files on a remote host over SFTP
#[derive(Parser, Debug, Default)]
#[command(name = "sftpb", version, about)]
pub(crate) struct Cli {
    /// Remote host as [USER@]HOST
    pub(crate) destination: Option<String>,

    /// SSH port
    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    /// Private key file (PEM or OpenSSH)
    #[arg(short = 'i', long = "identity", value_name = "KEY")]
    pub(crate) identity: Option<String>,

    /// known_hosts file used to verify the server
    #[arg(short = 'k', long, value_name = "KNOWN_HOSTS")]
    pub(crate) known_hosts: Option<String>,

    /// Remote directory to open instead of the login directory
    #[arg(long, value_name = "DIR")]
    pub(crate) start_dir: Option<String>,

    /// Ask for the key passphrase before connecting
    #[arg(long)]
    pub(crate) passphrase_prompt: bool,

    /// List dotfiles from the start
    #[arg(long)]
    pub(crate) show_hidden: bool,

    /// Settings file, defaults to the per-user config dir
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

/// Optional JSON settings file. CLI flags win over anything set here.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) user: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) key_path: Option<String>,
    pub(crate) known_hosts: Option<String>,
    pub(crate) start_dir: Option<String>,
    pub(crate) show_hidden: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) endpoint: Endpoint,
    pub(crate) key_path: PathBuf,
    pub(crate) known_hosts: PathBuf,
    pub(crate) start_dir: Option<String>,
    pub(crate) show_hidden: bool,
    pub(crate) passphrase_prompt: bool,
}

impl Settings {
    pub(crate) fn resolve(cli: &Cli, file: FileConfig, env_user: Option<String>) -> Result<Self> {
        let (cli_user, cli_host) = match cli.destination.as_deref() {
            Some(destination) => {
                let (user, host) = split_destination(destination);
                (user, Some(host))
            }
            None => (None, None),
        };
        let host = cli_host
            .or(file.host)
            .filter(|host| !host.is_empty())
            .context("no host given, pass [USER@]HOST or set \"host\" in the config file")?;
        let user = cli_user
            .or(file.user)
            .or(env_user)
            .filter(|user| !user.is_empty())
            .context("no user given, pass USER@HOST or set \"user\" in the config file")?;
        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let key_path = cli
            .identity
            .clone()
            .or(file.key_path)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_string());
        let known_hosts = cli
            .known_hosts
            .clone()
            .or(file.known_hosts)
            .unwrap_or_else(|| DEFAULT_KNOWN_HOSTS.to_string());
        Ok(Self {
            endpoint: Endpoint { user, host, port },
            key_path: expand_tilde(&key_path),
            known_hosts: expand_tilde(&known_hosts),
            start_dir: cli.start_dir.clone().or(file.start_dir),
            show_hidden: cli.show_hidden || file.show_hidden.unwrap_or(false),
            passphrase_prompt: cli.passphrase_prompt,
        })
    }
}

fn split_destination(destination: &str) -> (Option<String>, String) {
    match destination.rsplit_once('@') {
        Some((user, host)) => (Some(user.to_string()), host.to_string()),
        None => (None, destination.to_string()),
    }
}

pub(crate) fn config_path() -> Result<PathBuf> {
    app_file(dirs::config_dir(), "config.json")
}

pub(crate) fn log_path() -> Result<PathBuf> {
    app_file(dirs::data_dir(), "sftp-browse.log")
}

fn app_file(base: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    if let Some(mut dir) = base {
        dir.push(APP_DIR);
        dir.push(name);
        return Ok(dir);
    }
    let mut fallback = std::env::current_dir().context("current dir")?;
    fallback.push(format!("{APP_DIR}-{name}"));
    Ok(fallback)
}

/// Reads the settings file; a missing file means all defaults.
pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_file_config(&content).with_context(|| format!("parse config file {}", path.display()))
}

fn parse_file_config(content: &str) -> Result<FileConfig> {
    Ok(serde_json::from_str(content)?)
}

/// Passphrase from the environment, or typed in when `prompt` is set. Empty otherwise.
pub(crate) fn passphrase(prompt: bool) -> Result<SecretString> {
    if !prompt {
        if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
            return Ok(SecretString::from(value));
        }
        return Ok(SecretString::from(String::new()));
    }
    prompt_passphrase()
}

pub(crate) fn prompt_passphrase() -> Result<SecretString> {
    let value = rpassword::prompt_password("Key passphrase: ").context("read key passphrase")?;
    Ok(SecretString::from(value))
}
