use std::collections::HashMap;

use lumistrip_protocol::{AnimationInfo, RunningAnimationParams, Section, StripInfo};

/// Client-held cache of server-reported state, kept in sync by the
/// receive loop. Only ever mutated by the connection controller; callers
/// see snapshots through the accessors on
/// [`LedStripClient`](crate::LedStripClient).
#[derive(Default)]
pub struct Mirror {
    pub(crate) running_animations: HashMap<String, RunningAnimationParams>,
    pub(crate) sections: HashMap<String, Section>,
    pub(crate) supported_animations: HashMap<String, AnimationInfo>,
    pub(crate) strip_info: Option<StripInfo>,
}

impl Mirror {
    /// Reset performed by `start`, so the mirror only ever reflects
    /// messages received on the current connection.
    pub(crate) fn clear_all(&mut self) {
        self.running_animations.clear();
        self.sections.clear();
        self.supported_animations.clear();
        self.strip_info = None;
    }
}
