use serde::{Deserialize, Serialize};

/// Per-channel floors for the skin-tone pixel test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinToneThresholds {
    pub red_floor: u8,
    pub green_floor: u8,
    pub blue_floor: u8,
    /// Red must exceed green by more than this many levels.
    pub min_red_green_gap: u8,
}

impl Default for SkinToneThresholds {
    fn default() -> Self {
        Self {
            red_floor: 95,
            green_floor: 40,
            blue_floor: 20,
            min_red_green_gap: 15,
        }
    }
}

/// Configuration for the face-presence heuristic with tunable thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceHeuristicConfig {
    /// Frames are downscaled to this size before analysis
    pub sample_width: u32,
    pub sample_height: u32,

    /// Side of the square window analysed around the frame's midpoint
    pub window_size: u32,

    /// Mean of R,G,B over the window must exceed this
    pub min_luminance: f64,

    /// Fraction of skin-tone pixels in the window must exceed this
    pub min_skin_ratio: f64,

    pub skin: SkinToneThresholds,

    /// Consecutive absent samples before the banner is raised
    pub absence_threshold: u32,
}

impl Default for FaceHeuristicConfig {
    fn default() -> Self {
        Self {
            sample_width: 64,
            sample_height: 48,
            window_size: 40,
            min_luminance: 60.0,
            min_skin_ratio: 0.15,
            skin: SkinToneThresholds::default(),
            absence_threshold: 5,
        }
    }
}

impl FaceHeuristicConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_width == 0 || self.sample_height == 0 {
            return Err("face sample size must be non-zero".into());
        }
        if self.window_size == 0 {
            return Err("face window size must be non-zero".into());
        }
        if !(0.0..=255.0).contains(&self.min_luminance) {
            return Err(format!(
                "min_luminance {} outside 0..=255",
                self.min_luminance
            ));
        }
        if !(0.0..1.0).contains(&self.min_skin_ratio) {
            return Err(format!(
                "min_skin_ratio {} outside 0..1",
                self.min_skin_ratio
            ));
        }
        if self.absence_threshold == 0 {
            return Err("absence_threshold must be at least 1".into());
        }
        Ok(())
    }
}
