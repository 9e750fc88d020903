use log::{debug, error, warn};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the tool may run before it is asked to terminate.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a terminated process gets before it is killed outright.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{binary} not found: {source}")]
    BinaryNotFound {
        binary: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {binary}: {source}")]
    Wait {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("command timed out")]
    Timeout,
}

/// Runs an external tool and returns its combined stdout and stderr.
pub trait HostCommand {
    fn run(&self, binary: &str, args: &[String]) -> Result<String, RunError>;
}

impl<T: HostCommand + ?Sized> HostCommand for &T {
    fn run(&self, binary: &str, args: &[String]) -> Result<String, RunError> {
        (**self).run(binary, args)
    }
}

/// Executes binaries found on `PATH` with a timeout and SIGTERM/SIGKILL escalation.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    pub timeout: Duration,
    pub kill_grace: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            kill_grace: KILL_GRACE,
        }
    }
}

impl CommandRunner {
    pub fn new(timeout: Duration, kill_grace: Duration) -> Self {
        Self { timeout, kill_grace }
    }
}

impl HostCommand for CommandRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<String, RunError> {
        let path = which::which(binary).map_err(|source| RunError::BinaryNotFound {
            binary: binary.to_string(),
            source,
        })?;
        let mut cmd = Command::new(path);
        cmd.args(args);
        let output = combined_output_timeout(cmd, binary, self.timeout, self.kill_grace)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

/// Starts `cmd` with stdout and stderr sharing one buffer and waits for it.
///
/// The child leads its own process group, and the timeout covers both the
/// child and every descendant still holding its output pipes. Output is only
/// returned when all of them finish in time. The exit code is not inspected:
/// a process that exits non-zero before the timeout still yields its output.
/// Anything that ends after SIGTERM has been sent is [`RunError::Timeout`].
pub fn combined_output_timeout(
    mut cmd: Command,
    label: &str,
    timeout: Duration,
    kill_grace: Duration,
) -> Result<Vec<u8>, RunError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);
    let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
        binary: label.to_string(),
        source,
    })?;

    let mut pipes = [
        child.stdout.take().map(|s| File::from(OwnedFd::from(s))),
        child.stderr.take().map(|s| File::from(OwnedFd::from(s))),
    ];
    let mut output = Vec::new();
    let mut exited = false;
    let deadline = Instant::now() + timeout;

    loop {
        if !exited {
            match child.try_wait() {
                Ok(Some(status)) => {
                    exited = true;
                    if !status.success() {
                        debug!("{label} exited with {status}; ignoring exit status");
                    }
                }
                Ok(None) => {}
                Err(source) => return Err(abort(&mut child, label, source)),
            }
        }
        if exited && pipes.iter().all(Option::is_none) {
            return Ok(output);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        if let Err(source) = pump(&mut pipes, &mut output, remaining.min(POLL_INTERVAL)) {
            return Err(abort(&mut child, label, source));
        }
    }

    if exited {
        warn!("{label} exited but its output pipes are still open after {timeout:?}; sending SIGTERM");
    } else {
        warn!("{label} did not exit within {timeout:?}; sending SIGTERM");
    }
    terminate(&mut child, label, kill_grace, &mut pipes);
    Err(RunError::Timeout)
}

/// SIGTERM to the group, then SIGKILL once `kill_grace` passes with the child
/// or its pipes still alive. Reaps the child before returning.
fn terminate(child: &mut Child, label: &str, kill_grace: Duration, pipes: &mut [Option<File>]) {
    let pid = child.id();
    if let Err(err) = signal_group(pid, libc::SIGTERM) {
        error!("Error terminating process group {pid}: {err}");
    }

    let grace_deadline = Instant::now() + kill_grace;
    // Output after the timeout is discarded.
    let mut sink = Vec::new();
    let finished = loop {
        let exited = matches!(child.try_wait(), Ok(Some(_)));
        if exited && pipes.iter().all(Option::is_none) {
            break true;
        }
        let remaining = grace_deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || pump(pipes, &mut sink, remaining.min(POLL_INTERVAL)).is_err() {
            break false;
        }
        sink.clear();
    };

    if !finished {
        warn!("{label} still running {kill_grace:?} after SIGTERM; killing");
        if let Err(err) = signal_group(pid, libc::SIGKILL) {
            error!("Error killing process group {pid}: {err}");
        }
    }
    let _ = child.wait();
}

/// Kills the whole group after a wait failure.
fn abort(child: &mut Child, label: &str, source: io::Error) -> RunError {
    let _ = signal_group(child.id(), libc::SIGKILL);
    let _ = child.wait();
    RunError::Wait {
        binary: label.to_string(),
        source,
    }
}

/// Waits up to `wait` for any open pipe to become readable and reads what is
/// there. A pipe is set to `None` once it reaches end of file.
fn pump(pipes: &mut [Option<File>], output: &mut Vec<u8>, wait: Duration) -> io::Result<()> {
    let mut fds: Vec<libc::pollfd> = pipes
        .iter()
        .flatten()
        .map(|file| libc::pollfd {
            fd: file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();
    if fds.is_empty() {
        thread::sleep(wait);
        return Ok(());
    }

    let timeout_ms = wait.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
    let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
    if ret == -1 {
        let err = io::Error::last_os_error();
        return if err.kind() == io::ErrorKind::Interrupted {
            Ok(())
        } else {
            Err(err)
        };
    }

    let mut chunk = [0u8; 4096];
    for pipe in pipes.iter_mut() {
        let Some(file) = pipe.as_mut() else {
            continue;
        };
        let fd = file.as_raw_fd();
        if !fds.iter().any(|p| p.fd == fd && p.revents != 0) {
            continue;
        }
        let closed = match file.read(&mut chunk) {
            Ok(0) => true,
            Ok(n) => {
                output.extend_from_slice(&chunk[..n]);
                false
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => false,
            Err(_) => true,
        };
        if closed {
            *pipe = None;
        }
    }
    Ok(())
}

/// Sends `signal` to every process in the group led by `pid`.
fn signal_group(pid: u32, signal: libc::c_int) -> Result<(), io::Error> {
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
