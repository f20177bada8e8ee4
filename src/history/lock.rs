use fs2::FileExt;
use log::debug;
use std::fs::File;
use std::thread::sleep;
use std::time::Duration;

use crate::error::HistoryError;

/// Bounded, non-blocking acquisition of an advisory exclusive lock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LockPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl LockPolicy {
    /// Runs `op` while holding an exclusive lock on `file`.
    ///
    /// Each attempt is a `try_lock`; between attempts the thread sleeps for
    /// `delay`. The lock is released as soon as `op` returns.
    pub fn run<T>(
        &self,
        file: &mut File,
        mut op: impl FnMut(&mut File) -> Result<T, HistoryError>,
    ) -> Result<T, HistoryError> {
        let attempts = self.attempts.max(1);

        for attempt in 1..=attempts {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    let result = op(file);
                    if let Err(e) = <File as FileExt>::unlock(file) {
                        debug!("Failed to release history lock: {}", e);
                    }
                    return result;
                }
                Err(e) => {
                    debug!(
                        "History file locked (attempt {}/{}): {}",
                        attempt, attempts, e
                    );
                    if attempt < attempts {
                        sleep(self.delay);
                    }
                }
            }
        }

        Err(HistoryError::LockContended { attempts })
    }
}
