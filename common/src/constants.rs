/// Hexadecimal digits needed to print one 64-bit limb.
pub const LIMB_HEX_DIGITS: usize = 16;
pub const LIMB_BITS: u32 = 64;
/// Largest top limb for which `3 * limb + 2` still fits in one limb.
pub const ODD_STEP_HEADROOM_LIMIT: u64 = 0x5555_5555_5555_5554;
pub const CHECKPOINT_FILE_SUFFIX: &str = "cache";
pub const CHECKPOINT_TEMP_SUFFIX: &str = "tmp";
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 60;
