//! Typed records produced by the extraction pipeline.
//!
//! Every record is built once, top-down, and never mutated after the
//! component that owns it returns. Sum types carry the "exactly one of
//! these is populated" invariants that the source document's grammar
//! implies.

mod ability;
mod damage;
mod distance;
mod effect;
mod monster;
mod power_roll;

pub use ability::{Ability, AbilityKind, MaliceCost, MaliceEffect};
pub use damage::{DamageModifiers, DamageType};
pub use distance::{Distance, Target, TargetCount};
pub use effect::{Condition, Effect, EffectDuration, PotencyEffect};
pub use monster::{
    CaptainBonus, Characteristic, Characteristics, Monster, MonsterBlock, MonsterHeader,
    Organization, Role,
};
pub use power_roll::{PowerRoll, PowerRollTier};
