// Shared subprocess runner: captured output with a hard deadline.
// Both external tools (the build toolchain and the ABI analyzer) go
// through here so the deadline handling exists exactly once.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct Captured {
    /// `None` when the child was killed at the deadline.
    pub status: Option<ExitStatus>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `cmd` to completion, draining both output streams. The child is
/// killed once `timeout` elapses.
pub fn run_captured(mut cmd: Command, timeout: Duration) -> io::Result<Captured> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    // Reader threads keep the pipes drained while the poll loop below
    // stays in control of the deadline.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_deadline(&mut child, timeout)?;
    Ok(Captured {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_a_finished_process() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let captured = run_captured(cmd, Duration::from_secs(5)).unwrap();
        assert!(captured.status.unwrap().success());
        assert_eq!(String::from_utf8_lossy(&captured.stdout).trim(), "hello");
    }

    #[test]
    fn reports_nonzero_exit_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo oops >&2; exit 3"]);
        let captured = run_captured(cmd, Duration::from_secs(5)).unwrap();
        assert!(!captured.status.unwrap().success());
        assert_eq!(String::from_utf8_lossy(&captured.stderr).trim(), "oops");
    }

    #[test]
    fn kills_a_process_past_the_deadline() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let started = Instant::now();
        let captured = run_captured(cmd, Duration::from_millis(200)).unwrap();
        assert!(captured.status.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
