//! Minimal headless harness for `oriterm_core`.
//!
//! Spawns a shell behind the library's `Session` façade, relays stdin to
//! the PTY on one thread, and polls `read_pty` for output on the main
//! thread — demonstrating the non-blocking contract `Session`/`Pty`
//! expose rather than driving a GUI event loop.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use oriterm_core::Session;

fn main() {
    env_logger::init();

    let session = Session::new(80, 24);
    if let Err(e) = session.spawn_shell(None, None) {
        log::error!("failed to spawn shell: {e}");
        std::process::exit(1);
    }

    let writer_session = session.clone();
    let _input = thread::spawn(move || {
        let mut stdin = io::stdin();
        let mut buf = [0u8; 4096];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => {
                    if writer_session.write_pty(&buf[..n]) < 0 {
                        return;
                    }
                }
            }
        }
    });

    let mut stdout = io::stdout();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match session.read_pty(&mut buf) {
            n if n > 0 => {
                if stdout.write_all(&buf).is_err() || stdout.flush().is_err() {
                    break;
                }
            }
            n if n < 0 => {
                log::info!(
                    "shell exited, code={:?}",
                    session.child_exit_code().unwrap_or(-1)
                );
                break;
            }
            _ => thread::sleep(Duration::from_millis(10)),
        }
    }
}
