// src/leveling.rs

use serde::Serialize;

use crate::config::{MAX_LEVEL, XP_PER_LEVEL};

/// Display names per level. Levels 2, 4 and 6 share the name of the tier
/// below them; only 1, 3, 5, 7 and 8 open a new tier.
const LEVEL_NAMES: [&str; MAX_LEVEL as usize] = [
    "Pemula", "Pemula", "Amatir", "Amatir", "Basic", "Basic", "Pro", "Ace",
];

/// UI styling per level. Fixed configuration, not computed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LevelStyle {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

const LEVEL_STYLES: [LevelStyle; MAX_LEVEL as usize] = [
    LevelStyle { name: "Pemula", color: "#9ca3af", icon: "seedling" },
    LevelStyle { name: "Pemula", color: "#9ca3af", icon: "seedling" },
    LevelStyle { name: "Amatir", color: "#22c55e", icon: "leaf" },
    LevelStyle { name: "Amatir", color: "#22c55e", icon: "leaf" },
    LevelStyle { name: "Basic", color: "#3b82f6", icon: "shield" },
    LevelStyle { name: "Basic", color: "#3b82f6", icon: "shield" },
    LevelStyle { name: "Pro", color: "#a855f7", icon: "star" },
    LevelStyle { name: "Ace", color: "#f59e0b", icon: "crown" },
];

/// Snapshot of a user's position in the level ladder, derived purely from
/// total XP. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: i64,
    pub level_name: &'static str,
    pub current_level_xp: i64,
    pub xp_for_next_level: i64,
    pub progress_percentage: i64,
    pub is_max_level: bool,
}

/// Maps total XP to a level in [1, MAX_LEVEL].
/// Level 1 spans XP [0, 99], level n spans [(n-1)*100, n*100 - 1], and the
/// last level absorbs everything from 700 upward.
pub fn level_for_xp(total_xp: i64) -> i64 {
    let total_xp = total_xp.max(0);
    (total_xp / XP_PER_LEVEL + 1).min(MAX_LEVEL)
}

/// Display name for a level. Out-of-range input is clamped.
pub fn level_name(level: i64) -> &'static str {
    let idx = level.clamp(1, MAX_LEVEL) as usize - 1;
    LEVEL_NAMES[idx]
}

/// UI style entry for a level. Out-of-range input is clamped.
pub fn level_style(level: i64) -> LevelStyle {
    let idx = level.clamp(1, MAX_LEVEL) as usize - 1;
    LEVEL_STYLES[idx]
}

/// Computes the full level snapshot for a given XP total.
/// Negative XP is treated as 0.
pub fn level_info(total_xp: i64) -> LevelInfo {
    let total_xp = total_xp.max(0);
    let level = level_for_xp(total_xp);

    if level == MAX_LEVEL {
        return LevelInfo {
            level,
            level_name: level_name(level),
            current_level_xp: total_xp - (level - 1) * XP_PER_LEVEL,
            xp_for_next_level: 0,
            progress_percentage: 100,
            is_max_level: true,
        };
    }

    let xp_for_current_level = (level - 1) * XP_PER_LEVEL;
    let current_level_xp = total_xp - xp_for_current_level;

    LevelInfo {
        level,
        level_name: level_name(level),
        current_level_xp,
        xp_for_next_level: level * XP_PER_LEVEL,
        progress_percentage: (current_level_xp * 100 / XP_PER_LEVEL).min(100),
        is_max_level: false,
    }
}
