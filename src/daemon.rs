//! Detach from the terminal

use std::fs::OpenOptions;
use std::io;
use std::os::unix::io::AsRawFd;

/// Fork into the background.
///
/// The parent exits immediately. In the child, stdin/stdout/stderr are
/// pointed at `/dev/null` so descriptors opened later never reuse 0-2,
/// then a new session is started.
pub fn daemonize() -> io::Result<()> {
    // SAFETY: called before any other thread is spawned
    match unsafe { libc::fork() } {
        -1 => return Err(io::Error::last_os_error()),
        0 => {}
        _ => std::process::exit(0),
    }

    let null = OpenOptions::new().read(true).write(true).open("/dev/null")?;
    for fd in 0..=2 {
        // SAFETY: both descriptors are valid for the duration of the call
        if unsafe { libc::dup2(null.as_raw_fd(), fd) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }

    // SAFETY: plain syscall without pointer arguments
    if unsafe { libc::setsid() } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
