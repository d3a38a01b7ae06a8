use crate::models::WarningEvent;

/// Callbacks the embedding UI receives. Every method defaults to a no-op,
/// so hosts implement only what they render.
pub trait MonitorListener: Send + Sync {
    /// Every scored violation and every unscored notice.
    fn on_warning(&self, _warning: &WarningEvent) {}

    /// Invoked exactly once, when the strike limit is reached.
    fn on_disqualify(&self, _reason: &str) {}

    /// The exam countdown reached zero.
    fn on_time_up(&self) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl MonitorListener for NoopListener {}
