use crate::{environment::ActiveElement, models::ProctorEventType};

use super::Detection;

pub const TAB_SWITCH_REASON: &str = "Tab switch detected!";
pub const WINDOW_BLUR_REASON: &str = "Window focus lost (Alt-Tab/Minimize)!";

const TAB_SWITCH_CONFIDENCE: f64 = 1.0;
const WINDOW_BLUR_CONFIDENCE: f64 = 0.8;

/// Tab switches and window focus loss. Every firing is a new violation, so
/// the only state kept is a tally for the snapshot.
#[derive(Debug, Default)]
pub struct FocusDetector {
    fired: u32,
}

impl FocusDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn on_visibility_change(&mut self, hidden: bool, armed: bool) -> Option<Detection> {
        if !(hidden && armed) {
            return None;
        }
        self.fired += 1;
        Some(Detection {
            reason: TAB_SWITCH_REASON,
            event_type: ProctorEventType::TabSwitch,
            confidence: TAB_SWITCH_CONFIDENCE,
        })
    }

    /// A blur that leaves focus on the body is an in-page focus change,
    /// not the window losing focus.
    pub fn on_blur(&mut self, active_element: &ActiveElement, armed: bool) -> Option<Detection> {
        if !armed || *active_element == ActiveElement::Body {
            return None;
        }
        self.fired += 1;
        Some(Detection {
            reason: WINDOW_BLUR_REASON,
            event_type: ProctorEventType::TabSwitch,
            confidence: WINDOW_BLUR_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_document_is_a_tab_switch() {
        let mut detector = FocusDetector::new();
        let detection = detector.on_visibility_change(true, true).unwrap();
        assert_eq!(detection.reason, TAB_SWITCH_REASON);
        assert_eq!(detection.confidence, 1.0);
        assert!(detector.on_visibility_change(false, true).is_none());
        assert_eq!(detector.fired(), 1);
    }

    #[test]
    fn blur_with_focused_element_is_softer_signal() {
        let mut detector = FocusDetector::new();
        let detection = detector
            .on_blur(&ActiveElement::Element("iframe".into()), true)
            .unwrap();
        assert_eq!(detection.reason, WINDOW_BLUR_REASON);
        assert_eq!(detection.event_type, ProctorEventType::TabSwitch);
        assert_eq!(detection.confidence, 0.8);
        assert!(detector.on_blur(&ActiveElement::Body, true).is_none());
    }

    #[test]
    fn nothing_fires_while_unarmed() {
        let mut detector = FocusDetector::new();
        assert!(detector.on_visibility_change(true, false).is_none());
        assert!(detector
            .on_blur(&ActiveElement::Element("input".into()), false)
            .is_none());
        assert_eq!(detector.fired(), 0);
    }
}
