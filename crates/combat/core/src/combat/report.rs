use crate::state::{EntityId, Position};

use super::{BlockKind, CombatDamage, Rejection};

/// What happened to one creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetResult {
    /// Health or mana changed by `damage`.
    Applied { damage: CombatDamage },
    /// Defenses vetoed the hit.
    Blocked { block: BlockKind },
    /// The world refused the change (dead target, no mana pool, ...).
    Unchanged,
    /// Non-damaging combat: conditions, dispel and hooks ran.
    Affected,
    /// Eligibility rules refused the interaction.
    Rejected(Rejection),
    /// An aggressive combat aimed at its own caster.
    SelfTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOutcome {
    pub target: EntityId,
    pub result: TargetResult,
}

/// Health and mana returned to the caster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeechOutcome {
    pub life: i32,
    pub mana: i32,
}

/// Summary of one resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatReport {
    /// Damage as rolled, before per-target refinement.
    pub base_damage: CombatDamage,
    /// Locations the combat reached, in projection order.
    pub tiles: Vec<Position>,
    /// Locations refused by eligibility rules.
    pub skipped_tiles: Vec<(Position, Rejection)>,
    pub outcomes: Vec<TargetOutcome>,
    pub leech: LeechOutcome,
}

impl CombatReport {
    pub(crate) fn push(&mut self, target: EntityId, result: TargetResult) {
        tracing::debug!(%target, ?result, "target outcome");
        self.outcomes.push(TargetOutcome { target, result });
    }

    pub fn outcome_for(&self, target: EntityId) -> Option<&TargetResult> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.target == target)
            .map(|outcome| &outcome.result)
    }

    /// Number of creatures whose health or mana changed.
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.result, TargetResult::Applied { .. }))
            .count()
    }
}
