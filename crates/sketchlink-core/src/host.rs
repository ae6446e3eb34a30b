//! Host-side collaborators of an editing session.
//!
//! The dialog that frames the editor and the notification area are owned by
//! the host application. The bridge only needs these two narrow seams.

/// User-visible notifications.
///
/// Both calls are fire-and-forget; the bridge never waits on them.
pub trait NotificationSink: Send + Sync {
    /// Shows an informational message (e.g. a successful save).
    fn notify(&self, title: &str, message: &str);

    /// Shows a warning (e.g. a failed save or a missing record).
    fn warn(&self, title: &str, message: &str);
}

/// The window or dialog hosting the editor frame.
pub trait HostingSurface: Send + Sync {
    /// Closes the surface. Called once after a successful save.
    fn close(&self);
}
