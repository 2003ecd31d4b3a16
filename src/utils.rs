//! Utility functions for path handling and retries.
//!
//! This module provides helpers used by the bot and its companion binary.

use std::{
    fmt::Display,
    future::Future,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use log::warn;
use tokio::time::sleep;

/// Returns the directory containing the running executable.
///
/// Response files are looked up there so the bot behaves the same whatever
/// directory it is started from.
///
/// # Errors
///
/// Fails if the executable path cannot be determined.
pub fn executable_dir() -> Result<PathBuf, io::Error> {
    let executable = std::env::current_exe()?;
    executable
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))
}

/// Runs `operation` up to `attempts` times.
///
/// An error is retried only when `is_transient` accepts it, after waiting
/// `delay`; the delay doubles after every retry. The last result is returned
/// as is.
pub async fn retry<T, E, F, Fut, P>(
    attempts: u32,
    delay: Duration,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut delay = delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Err(e) if attempt < attempts && is_transient(&e) => {
                warn!(
                    "attempt {}/{} failed ({}), retrying in {}s",
                    attempt,
                    attempts,
                    e,
                    delay.as_secs()
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}
