//! Grant mask bits and storage limits

// Capability bit constants
pub const VIEW: u64 = 1;
pub const EDIT: u64 = 1 << 1;
pub const DELETE: u64 = 1 << 2;
/// Only meaningful on user override rows
pub const OVERRIDE_ROLE: u64 = 1 << 3;

pub const ALL_ACTIONS: u64 = VIEW | EDIT | DELETE;

/// Separator inside composite keys (`target \0 item`)
pub const KEY_SEP: u8 = 0;

/// LMDB keys are capped at 511 bytes; two ids plus a separator must fit
pub const MAX_ID_LEN: usize = 255;

pub const DEFAULT_MAP_SIZE: usize = 1 << 30;
pub const MAX_DBS: u32 = 8;

// Capability name mappings
const CAPS: &[(&str, u64)] = &[
    ("view", VIEW),
    ("edit", EDIT),
    ("delete", DELETE),
    ("override_role", OVERRIDE_ROLE),
];

/// Convert a grant mask to a list of capability names
pub fn caps_to_names(mask: u64) -> Vec<&'static str> {
    CAPS.iter()
        .filter(|(_, b)| mask & b == *b)
        .map(|(n, _)| *n)
        .collect()
}
