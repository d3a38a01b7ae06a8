use serde::{Deserialize, Serialize};

/// Debounced face-absence state, fed one classification per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacePresenceState {
    pub consecutive_absences: u32,
    pub is_warning_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    Unchanged,
    /// The absence threshold was crossed on this sample.
    WarningRaised,
    /// A present sample ended an active warning.
    WarningCleared,
}

impl FacePresenceState {
    pub fn observe(&mut self, face_present: bool, absence_threshold: u32) -> PresenceTransition {
        if face_present {
            let was_active = self.is_warning_active;
            *self = Self::default();
            return if was_active {
                PresenceTransition::WarningCleared
            } else {
                PresenceTransition::Unchanged
            };
        }

        self.consecutive_absences = self.consecutive_absences.saturating_add(1);
        if self.consecutive_absences >= absence_threshold && !self.is_warning_active {
            self.is_warning_active = true;
            return PresenceTransition::WarningRaised;
        }
        PresenceTransition::Unchanged
    }
}
