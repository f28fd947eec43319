//! In-game variables visible to NewGRFs while they load.
//!
//! Conditional skips and parameter computations read these through ids
//! `0x80..=0xFF`; variational sprite groups read the same catalogue through
//! ids `0x00..=0x3F`. Ids below `0x80` in the action form are ordinary
//! per-file parameters.
//!
//! ## Catalogue (action id = group id + 0x80)
//! ```text
//! 0x00  days since 1920-01-01       0x0F  rail track cost factors
//! 0x01  years since 1920            0x12  game mode
//! 0x03  climate                     0x1A  all bits set
//! 0x04  load stage                  0x1B  display options
//! 0x05  patch flags (bit test)      0x1D  platform (1)
//! 0x06  road side << 4              0x1E  misc GRF features
//! 0x0B  TTDPatch version            0x21  engine version
//! 0x0D  TTD version (1 = Windows)   0x23  long date
//! 0x0E  train sprite y-offset       0x24  long year
//! ```

use crate::config::{GameSettings, RoadSide};
use crate::diagnostics::Diagnostics;
use crate::registry::Parameters;

/// Returned for variables the engine does not know.
pub const UNKNOWN_VARIABLE: u32 = 0xFFFF_FFFF;

/// Version reported through variable 0x0B.
pub const TTDPATCH_VERSION: u32 = (2 << 24) | (6 << 20) | (1 << 16) | 1382;

/// Version reported through variable 0x21.
pub const ENGINE_VERSION: u32 = 0x0E00_0000;

/// First year of the original calendar.
pub const BASE_YEAR: u32 = 1920;

/// Pass over the configured files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadStage {
    /// Record labels; nothing else runs.
    Reserve,
    /// Decide which files become active.
    Activation,
    /// Apply everything for real.
    Apply,
}

impl LoadStage {
    pub const ALL: [LoadStage; 3] = [LoadStage::Reserve, LoadStage::Activation, LoadStage::Apply];

    /// Value of variable 0x84: 0 while initialising, 1 while activating.
    pub fn variable_value(self) -> u32 {
        match self {
            LoadStage::Reserve | LoadStage::Activation => 0,
            LoadStage::Apply => 1,
        }
    }
}

/// Eight words of feature flags reported through variable 0x85.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFlags([u32; 8]);

impl PatchFlags {
    pub fn from_settings(settings: &GameSettings) -> Self {
        let mut words = [0u32; 8];
        words[0] = 1 << 0x1B;
        words[1] = [0x08, 0x0B, 0x14, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B]
            .iter()
            .fold(0, |acc, bit| acc | (1 << bit));
        words[2] = (1 << 0x0D) | (1 << 0x16) | (1 << 0x17);
        for &bit in &settings.extra_patch_flags {
            if let Some(word) = words.get_mut((bit / 32) as usize) {
                *word |= 1 << (bit % 32);
            }
        }
        Self(words)
    }

    pub fn word(&self, index: usize) -> u32 {
        self.0.get(index).copied().unwrap_or(0)
    }

    pub fn is_set(&self, bit: u32) -> bool {
        self.word((bit / 32) as usize) & (1 << (bit % 32)) != 0
    }
}

/// Process-wide tuning values written by parameter-set records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTuning {
    /// Y offset of train sprites in the details window (0x8E).
    pub traininfo_vehicle_pitch: i8,
    /// Cost multipliers of the four rail types (0x8F).
    pub railtype_cost_multipliers: [u8; 4],
    /// Misc GRF feature bits (0x9E).
    pub misc_grf_features: u32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            traininfo_vehicle_pitch: 0,
            railtype_cost_multipliers: [8; 4],
            misc_grf_features: 0,
        }
    }
}

/// Everything the variable engine reads.
#[derive(Debug, Clone, Copy)]
pub struct VarEnv<'a> {
    pub settings: &'a GameSettings,
    pub flags: &'a PatchFlags,
    pub tuning: &'a GameTuning,
    pub stage: LoadStage,
    /// Parameters of the file being decoded.
    pub params: &'a Parameters,
}

fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days from 0000-01-01 to January 1st of `year`.
fn days_until(year: u32) -> u32 {
    let y = year.saturating_sub(1);
    year * 365 + y / 4 - y / 100 + y / 400 + u32::from(year > 0)
}

impl VarEnv<'_> {
    fn start_year(&self) -> u32 {
        u32::from(self.settings.start_year)
    }

    /// Loading always happens on January 1st of the start year.
    fn date_since_base(&self) -> u32 {
        days_until(self.start_year().max(BASE_YEAR)) - days_until(BASE_YEAR)
    }
}

/// Read global variable `id` (group form, `0x00..=0x3F`).
///
/// Returns `None` for ids the engine does not provide.
pub fn global_variable(id: u8, env: &VarEnv<'_>) -> Option<u32> {
    let value = match id {
        0x00 => env.date_since_base(),
        0x01 => env.start_year().clamp(BASE_YEAR, BASE_YEAR + 255) - BASE_YEAR,
        0x02 => u32::from(is_leap_year(env.start_year())) << 15,
        0x03 => env.settings.climate.id(),
        0x06 => match env.settings.road_side {
            RoadSide::Left => 0,
            RoadSide::Right => 1 << 4,
        },
        0x09 | 0x0A | 0x11 => 0,
        0x0B => TTDPATCH_VERSION,
        0x0D => 1,
        0x0E => env.tuning.traininfo_vehicle_pitch as u8 as u32,
        0x0F => {
            let m = env.tuning.railtype_cost_multipliers;
            u32::from(m[0]) | u32::from(m[1]) << 8 | u32::from(m[3]) << 16
        }
        // Normal game.
        0x12 => 1,
        0x1A => u32::MAX,
        0x1B => 0x3F,
        0x1D => 1,
        0x1E => env.tuning.misc_grf_features,
        0x21 => ENGINE_VERSION,
        0x23 => days_until(env.start_year()),
        0x24 => env.start_year(),
        _ => return None,
    };
    Some(value)
}

/// Resolve a source selector of a skip-if or parameter-set record.
///
/// Ids below 0x80 read the current file's parameters. For the patch-flags
/// id 0x85, `cond` selects the flag word (`cond / 32`) and is folded to the
/// bit index within it (`cond % 32`); with no `cond` the value is 0. The
/// GRFID id 0x88 is resolved by callers against the registry and reads as 0
/// here. Unknown ids report a warning and yield [`UNKNOWN_VARIABLE`].
pub fn resolve_variable(
    id: u8,
    cond: Option<&mut u32>,
    env: &VarEnv<'_>,
    diag: &mut Diagnostics,
) -> u32 {
    match id {
        0x00..=0x7F => env.params.get(id as usize),
        0x84 => env.stage.variable_value(),
        0x85 => match cond {
            Some(cond) => {
                let word = env.flags.word((*cond / 32) as usize);
                *cond %= 32;
                word
            }
            None => 0,
        },
        0x88 => 0,
        _ => match global_variable(id - 0x80, env) {
            Some(value) => value,
            None => {
                diag.warn(format!("Unknown variable 0x{id:02X}"));
                UNKNOWN_VARIABLE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Climate;

    struct Fixture {
        settings: GameSettings,
        flags: PatchFlags,
        tuning: GameTuning,
        params: Parameters,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = GameSettings {
                climate: Climate::Tropic,
                road_side: RoadSide::Right,
                ..GameSettings::default()
            };
            Self {
                flags: PatchFlags::from_settings(&settings),
                settings,
                tuning: GameTuning::default(),
                params: Parameters::from_configured(&[11, 22]),
            }
        }

        fn env(&self, stage: LoadStage) -> VarEnv<'_> {
            VarEnv {
                settings: &self.settings,
                flags: &self.flags,
                tuning: &self.tuning,
                stage,
                params: &self.params,
            }
        }
    }

    #[test]
    fn plain_catalogue() {
        let fx = Fixture::new();
        let env = fx.env(LoadStage::Apply);
        let mut diag = Diagnostics::new();
        assert_eq!(resolve_variable(0x83, None, &env, &mut diag), 2);
        assert_eq!(resolve_variable(0x86, None, &env, &mut diag), 0x10);
        assert_eq!(resolve_variable(0x84, None, &env, &mut diag), 1);
        assert_eq!(resolve_variable(0x8B, None, &env, &mut diag), TTDPATCH_VERSION);
        assert_eq!(resolve_variable(0x9D, None, &env, &mut diag), 1);
        assert_eq!(resolve_variable(0x81, None, &env, &mut diag), 30);
        assert!(diag.entries().is_empty());
    }

    #[test]
    fn parameters_below_0x80() {
        let fx = Fixture::new();
        let env = fx.env(LoadStage::Activation);
        let mut diag = Diagnostics::new();
        assert_eq!(resolve_variable(0x01, None, &env, &mut diag), 22);
        assert_eq!(resolve_variable(0x40, None, &env, &mut diag), 0);
    }

    #[test]
    fn patch_flags_fold_the_index() {
        let fx = Fixture::new();
        let env = fx.env(LoadStage::Apply);
        let mut diag = Diagnostics::new();

        // Bit 0x0B of word 1.
        let mut cond = 32 + 0x0B;
        let word = resolve_variable(0x85, Some(&mut cond), &env, &mut diag);
        assert_eq!(cond, 0x0B);
        assert_ne!(word & (1 << cond), 0);

        assert_eq!(resolve_variable(0x85, None, &env, &mut diag), 0);
    }

    #[test]
    fn unknown_ids_warn() {
        let fx = Fixture::new();
        let env = fx.env(LoadStage::Apply);
        let mut diag = Diagnostics::new();
        assert_eq!(resolve_variable(0xF0, None, &env, &mut diag), UNKNOWN_VARIABLE);
        assert_eq!(diag.entries().len(), 1);
    }

    #[test]
    fn extra_flags_are_merged() {
        let settings = GameSettings {
            extra_patch_flags: vec![3, 64 + 5],
            ..GameSettings::default()
        };
        let flags = PatchFlags::from_settings(&settings);
        assert!(flags.is_set(3));
        assert!(flags.is_set(69));
        assert!(flags.is_set(0x1B));
        assert!(!flags.is_set(4));
    }

    #[test]
    fn date_counts_leap_days() {
        assert_eq!(days_until(1921) - days_until(1920), 366);
        assert_eq!(days_until(1922) - days_until(1921), 365);
    }
}
