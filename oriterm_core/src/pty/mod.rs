//! Non-blocking PTY wrapper around `portable_pty`.
//!
//! The host never blocks on a read: the actual OS read is inherently
//! blocking, so it runs on a dedicated background thread that forwards
//! chunks through a channel. `Pty::read` drains that channel with
//! `try_recv` and returns immediately either way, matching a regular
//! non-blocking socket's contract rather than `portable_pty`'s own
//! blocking `Read` impl.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};

/// Outcome of a single non-blocking `Pty::read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Nothing buffered right now; the child is still alive.
    WouldBlock,
    /// `_0` bytes were appended to the caller's buffer.
    Data(usize),
    /// The child has exited and all buffered output has been drained.
    Eof,
}

/// Exit status of the spawned child, captured once it has been reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: i32,
}

enum ReaderMsg {
    Data(Vec<u8>),
    Closed,
}

/// A spawned shell behind a pseudo-terminal.
pub struct Pty {
    writer: Option<Box<dyn Write + Send>>,
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    rx: Receiver<ReaderMsg>,
    dead: bool,
    exit_status: Option<ExitStatus>,
}

impl Pty {
    /// Spawn `shell` (or the platform default) behind a PTY sized to
    /// `cols`x`rows`, starting in `cwd` if given.
    pub fn spawn(shell: Option<&str>, cols: u16, rows: u16, cwd: Option<&str>) -> std::io::Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(to_io_error)?;

        let mut cmd = CommandBuilder::new(shell.map_or_else(default_shell, str::to_owned));
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        if let Some(dir) = cwd {
            cmd.cwd(dir);
        }

        let child = pair.slave.spawn_command(cmd).map_err(to_io_error)?;
        drop(pair.slave);

        let reader = pair.master.try_clone_reader().map_err(to_io_error)?;
        let writer = pair.master.take_writer().map_err(to_io_error)?;

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("oriterm-pty-reader".into())
            .spawn(move || run_reader(reader, &tx))
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        Ok(Self {
            writer: Some(writer),
            master: pair.master,
            child,
            rx,
            dead: false,
            exit_status: None,
        })
    }

    /// Drain any output currently buffered from the reader thread into
    /// `buf` without blocking.
    pub fn read(&mut self, buf: &mut Vec<u8>) -> ReadOutcome {
        if self.dead {
            return ReadOutcome::Eof;
        }

        let mut total = 0;
        loop {
            match self.rx.try_recv() {
                Ok(ReaderMsg::Data(chunk)) => {
                    total += chunk.len();
                    buf.extend_from_slice(&chunk);
                }
                Ok(ReaderMsg::Closed) | Err(TryRecvError::Disconnected) => {
                    self.dead = true;
                    self.reap();
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if total > 0 {
            ReadOutcome::Data(total)
        } else if self.dead {
            ReadOutcome::Eof
        } else {
            ReadOutcome::WouldBlock
        }
    }

    /// Write `bytes`, retrying on short writes. Returns the number of bytes
    /// actually written (may be less than `bytes.len()` if the PTY is gone).
    pub fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        let Some(writer) = self.writer.as_mut() else { return Ok(0) };

        let mut written = 0;
        while written < bytes.len() {
            match writer.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        let _ = writer.flush();
        Ok(written)
    }

    /// Resize the pseudo-terminal, including the pixel geometry xterm
    /// reports through `CSI 14 t`/`CSI 16 t`.
    pub fn resize(&self, cols: u16, rows: u16, pixel_width: u16, pixel_height: u16) -> std::io::Result<()> {
        self.master.resize(PtySize { rows, cols, pixel_width, pixel_height }).map_err(to_io_error)
    }

    /// Whether the reader thread has observed EOF/EIO and the child has
    /// been reaped (the PTY is permanently dead — see process() callers).
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Exit status of the child, once reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Close the write side and kill the child, reaping its exit status.
    /// Called when the owning session is freed.
    pub fn shutdown(&mut self) {
        self.writer.take();
        let _ = self.child.kill();
        self.reap();
        self.dead = true;
    }

    fn reap(&mut self) {
        if self.exit_status.is_some() {
            return;
        }
        if let Ok(Some(status)) = self.child.try_wait() {
            self.exit_status = Some(ExitStatus { code: status.exit_code() as i32 });
        }
    }
}

fn run_reader(mut reader: Box<dyn std::io::Read + Send>, tx: &mpsc::Sender<ReaderMsg>) {
    let mut buf = vec![0u8; 32 * 1024];
    loop {
        match reader.read(&mut buf) {
            Ok(0) | Err(_) => {
                let _ = tx.send(ReaderMsg::Closed);
                return;
            }
            Ok(n) => {
                if tx.send(ReaderMsg::Data(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
        }
    }
}

fn default_shell() -> String {
    if cfg!(windows) {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_owned())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_owned())
    }
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}
