// src/exec/signals.rs

//! Pid probing and signal delivery.
//!
//! Only unix gets real signals; elsewhere the probe reports "not alive" and
//! signalling fails, so callers fall back to killing through the child handle.

use anyhow::Result;

#[cfg(unix)]
mod imp {
    use anyhow::{Context, Result};
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    fn to_pid(pid: u32) -> Result<Pid> {
        let raw = i32::try_from(pid).with_context(|| format!("pid {pid} out of range"))?;
        Ok(Pid::from_raw(raw))
    }

    pub fn pid_alive(pid: u32) -> bool {
        match to_pid(pid) {
            Ok(pid) => kill(pid, None).is_ok(),
            Err(_) => false,
        }
    }

    pub fn send(pid: u32, signal: Signal) -> Result<()> {
        kill(to_pid(pid)?, signal).with_context(|| format!("sending {signal:?} to pid {pid}"))
    }

    pub fn interrupt(pid: u32) -> Result<()> {
        send(pid, Signal::SIGINT)
    }

    pub fn force_kill(pid: u32) -> Result<()> {
        send(pid, Signal::SIGKILL)
    }
}

#[cfg(not(unix))]
mod imp {
    use anyhow::{bail, Result};

    pub fn pid_alive(_pid: u32) -> bool {
        false
    }

    pub fn interrupt(pid: u32) -> Result<()> {
        bail!("cannot deliver an interrupt to pid {pid} on this platform")
    }

    pub fn force_kill(pid: u32) -> Result<()> {
        bail!("cannot force-kill pid {pid} on this platform")
    }
}

/// Whether a process with this pid currently exists.
pub fn pid_alive(pid: u32) -> bool {
    imp::pid_alive(pid)
}

/// Ask the process to stop (SIGINT).
pub fn interrupt(pid: u32) -> Result<()> {
    imp::interrupt(pid)
}

/// Terminate the process unconditionally (SIGKILL).
pub fn force_kill(pid: u32) -> Result<()> {
    imp::force_kill(pid)
}
