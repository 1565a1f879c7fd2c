//! Calibrated weighting constants. These magnitudes are the contract the
//! scorer reproduces; they are not derived from anything and changing them
//! changes ranking behavior directly.

pub const RANKING_LIMIT: usize = 20;
pub const SURFACED_LIMIT: usize = 8;

// pick phase
pub const META_BASE_SCALE: f64 = 0.1;
pub const ROLE_OVERLAP_BASE: f64 = 8.0;
pub const ROLE_OVERLAP_PER_PICK: f64 = 2.0;
pub const ROLE_FIT_BONUS: f64 = 3.0;
pub const SPECIALIST_BASE: f64 = 2.0;
pub const SPECIALIST_ROLE_WR_SCALE: f64 = 0.08;
pub const HARD_COUNTER_WR: f64 = 35.0;
pub const RISK_SCALE: f64 = 0.3;
pub const COUNTER_SCALE: f64 = 0.2;
pub const SYNERGY_BONUS: f64 = 2.5;
pub const COMFORT_WR_SCALE: f64 = 0.1;
pub const RECENT_WR_SCALE: f64 = 0.08;
pub const PATTERN_FLOOR: f64 = 1.0;
pub const PATTERN_SCALE: f64 = 4.0;
pub const PATTERN_MISMATCH_MIN_SHARE: f64 = 0.5;

// first-pick logic (sequence slots 4 and 5)
pub const FIRST_PICK_WR_SCALE: f64 = 0.1;
pub const FIRST_PICK_VOLUME_SCALE: f64 = 0.2;
pub const FIRST_PICK_VOLUME_CAP: u32 = 10;
pub const FP_DENY_MIN_PICKS: u32 = 5;
pub const FP_DENY_MIN_WR: f64 = 52.0;
pub const FP_DENY_WR_SCALE: f64 = 0.15;
pub const FP_DENY_VOLUME_SCALE: f64 = 0.1;
pub const FP_DENY_VOLUME_CAP: u32 = 15;
pub const FP_POOL_COUNTER_EDGE: f64 = 2.0;
pub const FP_POOL_COUNTER_BONUS: f64 = 0.8;

// ban phase
pub const BAN_RATE_SCALE: f64 = 0.08;
pub const BAN_META_TIER_HIGH_WR: f64 = 55.0;
pub const BAN_META_TIER_HIGH: f64 = 3.0;
pub const BAN_META_TIER_MID_WR: f64 = 52.0;
pub const BAN_META_TIER_MID: f64 = 1.5;
pub const BAN_SLOT_SCALE: f64 = 1.5;
pub const BAN_PHASE_SCALE: f64 = 0.5;
pub const MVP_BAN_BONUS: f64 = 6.0;
pub const POOL_FREQ_SCALE: f64 = 0.4;
pub const POOL_FREQ_CAP: f64 = 4.0;
pub const PROTECT_SCALE: f64 = 0.25;
pub const DENY_MIN_PICKS: u32 = 3;
pub const DENY_VOLUME_SCALE: f64 = 0.3;
pub const DENY_VOLUME_CAP: u32 = 12;
pub const DENY_WR_SCALE: f64 = 0.15;
