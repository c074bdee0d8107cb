use std::io::{self, Read};

use crate::error::CommandError;

/// A session channel able to run one command.
pub(crate) trait ExecChannel: Read {
    fn exec(&mut self, command: &str) -> io::Result<()>;
    fn exit_status(&mut self) -> io::Result<i32>;
    fn close(&mut self) -> io::Result<()>;
}

pub(crate) trait ChannelOpener {
    type Channel: ExecChannel;

    fn open_channel(&self) -> io::Result<Self::Channel>;
}

impl ExecChannel for ssh2::Channel {
    fn exec(&mut self, command: &str) -> io::Result<()> {
        ssh2::Channel::exec(self, command)?;
        Ok(())
    }

    fn exit_status(&mut self) -> io::Result<i32> {
        self.wait_close()?;
        Ok(ssh2::Channel::exit_status(self)?)
    }

    fn close(&mut self) -> io::Result<()> {
        ssh2::Channel::close(self)?;
        self.wait_close()?;
        Ok(())
    }
}

impl ChannelOpener for ssh2::Session {
    type Channel = ssh2::Channel;

    fn open_channel(&self) -> io::Result<ssh2::Channel> {
        let mut channel = self.channel_session()?;
        // stderr arrives on the same stream as stdout
        channel.handle_extended_data(ssh2::ExtendedData::Merge)?;
        Ok(channel)
    }
}

/// Closes the channel when dropped, whatever path the caller took.
struct ChannelGuard<C: ExecChannel> {
    channel: C,
}

impl<C: ExecChannel> Drop for ChannelGuard<C> {
    fn drop(&mut self) {
        let _ = self.channel.close();
    }
}

/// Runs `command` on a fresh channel and returns its combined output.
///
/// No PTY is requested, so interactive prompts on the remote side will not work.
pub(crate) fn run_command<O: ChannelOpener>(session: &O, command: &str) -> Result<String, CommandError> {
    let mut guard = ChannelGuard {
        channel: session.open_channel()?,
    };
    guard.channel.exec(command)?;
    let mut raw = Vec::new();
    guard.channel.read_to_end(&mut raw)?;
    let output = String::from_utf8_lossy(&raw).into_owned();
    let status = guard.channel.exit_status()?;
    if status != 0 {
        return Err(CommandError::NonZeroExit(status, output));
    }
    Ok(output)
}
