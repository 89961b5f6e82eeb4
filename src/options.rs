use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

/// Tuning of a single flame's flicker.
///
/// Brightness indices drive the red channel; green is derived from it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlameOptions {
    /// Percent chance the flame suddenly falls towards `index_bottom`
    pub index_bottom_percent: u8,
    /// Absolute minimum red value
    pub index_bottom: i32,
    /// Minimum red value during normal flickering
    pub index_min: i32,
    pub index_max: i32,

    pub down_min_msecs: i32,
    pub down_max_msecs: i32,
    pub up_min_msecs: i32,
    pub up_max_msecs: i32,

    pub bright_hold_percent: u8,
    pub bright_hold_min_msecs: i32,
    pub bright_hold_max_msecs: i32,

    pub dim_hold_percent: u8,
    pub dim_hold_min_msecs: i32,
    pub dim_hold_max_msecs: i32,
}

impl Default for FlameOptions {
    fn default() -> Self {
        FlameOptions {
            index_bottom_percent: 10,
            index_bottom: 128,
            index_min: 192,
            index_max: 255,
            down_min_msecs: 20,
            down_max_msecs: 250,
            up_min_msecs: 20,
            up_max_msecs: 250,
            bright_hold_percent: 20,
            bright_hold_min_msecs: 0,
            bright_hold_max_msecs: 100,
            dim_hold_percent: 5,
            dim_hold_min_msecs: 0,
            dim_hold_max_msecs: 50,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CandleOptions {
    pub flame_count: usize,
    pub ignition_interval_secs: f64,
    /// Global brightness, applied by the pixel output
    pub brightness: f32,
    pub seed: u64,
    /// How often the pixel output gets flushed
    pub refresh_hz: f64,
    pub flame: FlameOptions,
}

impl Default for CandleOptions {
    fn default() -> Self {
        CandleOptions {
            flame_count: 8,
            ignition_interval_secs: 1.0,
            brightness: 0.5,
            seed: 10028,
            refresh_hz: 60.0,
            flame: FlameOptions::default(),
        }
    }
}

impl CandleOptions {
    pub fn load(path: &Path) -> Result<CandleOptions, String> {
        let options = match CandleOptions::from_config_file(path) {
            Ok(options) => options,
            Err(err) => return Err(format!("Cannot read {}: {}", path.display(), err)),
        };

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.flame_count == 0 {
            return Err("flame_count must be at least 1".to_string());
        }
        if !self.ignition_interval_secs.is_finite() || self.ignition_interval_secs < 0.0 {
            return Err(format!(
                "ignition_interval_secs must be a non-negative number, got {}",
                self.ignition_interval_secs
            ));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(format!(
                "brightness must be within [0, 1], got {}",
                self.brightness
            ));
        }
        if self.refresh_hz.is_nan() || self.refresh_hz <= 0.0 {
            return Err(format!(
                "refresh_hz must be positive, got {}",
                self.refresh_hz
            ));
        }

        self.flame.validate()
    }
}

impl FlameOptions {
    pub fn validate(&self) -> Result<(), String> {
        let f = self;
        if !(0 <= f.index_bottom && f.index_bottom <= f.index_min && f.index_min <= f.index_max)
            || f.index_max > 255
        {
            return Err(format!(
                "brightness indices must satisfy 0 <= index_bottom ({}) <= index_min ({}) <= index_max ({}) <= 255",
                f.index_bottom, f.index_min, f.index_max
            ));
        }

        let ranges = [
            ("down", f.down_min_msecs, f.down_max_msecs),
            ("up", f.up_min_msecs, f.up_max_msecs),
            ("bright_hold", f.bright_hold_min_msecs, f.bright_hold_max_msecs),
            ("dim_hold", f.dim_hold_min_msecs, f.dim_hold_max_msecs),
        ];
        for (name, min, max) in ranges {
            if min < 0 || min > max {
                return Err(format!(
                    "{name}_min_msecs ({min}) must be non-negative and not exceed {name}_max_msecs ({max})"
                ));
            }
        }

        let percents = [
            ("index_bottom_percent", f.index_bottom_percent),
            ("bright_hold_percent", f.bright_hold_percent),
            ("dim_hold_percent", f.dim_hold_percent),
        ];
        for (name, percent) in percents {
            if percent > 100 {
                return Err(format!("{name} must not exceed 100, got {percent}"));
            }
        }

        Ok(())
    }
}
