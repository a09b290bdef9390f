//! Document segmentation: monster headers and blocks, ability headers and
//! blocks.

pub mod ability;
pub mod monster;

pub use ability::split_ability_blocks;
pub use monster::{find_monster_headers, group_monster_blocks};
