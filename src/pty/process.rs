//! PTY Process Spawning
//!
//! Starts the remote-terminal client (telnet by default) inside a
//! pseudoterminal using the portable-pty crate, and bridges its blocking
//! I/O onto async channels.

use portable_pty::{native_pty_system, CommandBuilder, PtyPair, PtySize};
use std::io::{Read, Write};
use std::sync::mpsc::channel;
use std::thread;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, info, warn};

use super::streams::PtyStreams;
use crate::config::TransportConfig;
use crate::error::{Error, Result};

/// Spawn the configured client and return its streams
pub fn spawn_transport(config: &TransportConfig) -> Result<PtyStreams> {
    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(PtySize {
            rows: config.rows,
            cols: config.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::PtyCreationFailed {
            command: config.command.clone(),
            reason: e.to_string(),
        })?;

    let mut cmd_builder = CommandBuilder::new(&config.command);
    cmd_builder.args(&config.args);
    // Keep the remote service from emitting terminal control sequences
    cmd_builder.env("TERM", "dumb");

    let child = pair
        .slave
        .spawn_command(cmd_builder)
        .map_err(|e| Error::CommandSpawnFailed {
            command: config.command.clone(),
            reason: e.to_string(),
        })?;

    let streams = create_pty_streams(pair)?.with_child(child);
    info!(
        "Spawned '{} {}' (pid {:?})",
        config.command,
        config.args.join(" "),
        streams.process_id()
    );
    Ok(streams)
}

/// Create PTY streams from a PTY pair
fn create_pty_streams(pair: PtyPair) -> Result<PtyStreams> {
    let mut master_reader =
        pair.master
            .try_clone_reader()
            .map_err(|e| Error::PtyReaderCloneFailed {
                reason: e.to_string(),
            })?;
    let mut master_writer = pair
        .master
        .take_writer()
        .map_err(|e| Error::PtyWriterTakeFailed {
            reason: e.to_string(),
        })?;

    // Channel: PTY output -> async consumer
    let (tx_async_out, rx_async_out) = unbounded_channel::<Vec<u8>>();
    // Channel: async producer -> PTY writer thread
    let (tx_stdin, rx_stdin) = channel::<Vec<u8>>();

    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut consecutive_errors = 0;
        const MAX_CONSECUTIVE_ERRORS: u32 = 5;

        loop {
            match master_reader.read(&mut buf) {
                Ok(0) => {
                    debug!("PTY read EOF - client terminated");
                    break;
                }
                Ok(n) => {
                    consecutive_errors = 0;
                    if tx_async_out.send(buf[..n].to_vec()).is_err() {
                        debug!("PTY read: receiver dropped, stopping reader thread");
                        break;
                    }
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::Interrupted {
                        continue;
                    }

                    if e.kind() == std::io::ErrorKind::WouldBlock {
                        thread::sleep(std::time::Duration::from_millis(10));
                        continue;
                    }

                    consecutive_errors += 1;
                    warn!(
                        "PTY read error ({}): {} (attempt {}/{})",
                        e.kind(),
                        e,
                        consecutive_errors,
                        MAX_CONSECUTIVE_ERRORS
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("PTY read: too many consecutive errors, stopping reader thread");
                        break;
                    }

                    thread::sleep(std::time::Duration::from_millis(50));
                }
            }
        }
        debug!("PTY reader thread exiting");
    });

    thread::spawn(move || {
        while let Ok(data) = rx_stdin.recv() {
            let written = master_writer
                .write_all(&data)
                .and_then(|_| master_writer.flush());
            if let Err(e) = written {
                // The reader side sees EOF as well; the session reports it
                error!("PTY write error ({}): {}, stopping writer thread", e.kind(), e);
                return;
            }
        }
        debug!("PTY writer thread exiting");
    });

    Ok(PtyStreams::from_channels(rx_async_out, tx_stdin))
}
