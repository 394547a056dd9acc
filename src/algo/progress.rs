//! Progress callbacks for iterative mesh operations.
//!
//! Operations that run for several rounds (such as repeated subdivision)
//! accept a [`Progress`] and report `(current, total, message)` before each
//! round and once more on completion.
//!
//! # Example
//!
//! ```
//! use halfacet::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(0, 2, "Catmull-Clark subdivision");
//! ```

/// A shareable progress callback.
///
/// The callback receives:
/// - `current`: Completed steps
/// - `total`: Total number of steps
/// - `message`: Name of the running operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap `callback` as a progress reporter.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report that `current` of `total` steps are done.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// A reporter that ignores every update.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
