//! Scenario loader.
//!
//! A scenario is a small world (flagged tiles plus creatures) and one cast to
//! resolve in it. Tile and player flags use the bitflags text form, e.g.
//! `flags: "PROTECTION_ZONE | NO_PVP_ZONE"`.

use std::path::Path;

use anyhow::Context;
use combat_core::{
    AllowAll, BlockKind, CombatConfig, CombatEnv, CombatReport, ConditionKind, ConditionSet, CreatureKind,
    CreatureSnapshot, DamageComponent, DamageKind, EntityId, MemoryWorld, PlayerFlags, PlayerProfile, Position,
    ResourceMeter, RngOracle, RollStream, ScriptStack, Skull, SpecialSkills, TileFlags, WeaponDamage, WeaponProfile,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{CombatRegistry, LoadResult, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Base seed of the roll stream.
    #[serde(default)]
    pub seed: u64,
    /// World clock at the time of the cast.
    #[serde(default)]
    pub clock_ms: u64,
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
    pub creatures: Vec<CreatureSpec>,
    pub cast: CastSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSpec {
    pub position: (i32, i32, u8),
    #[serde(default)]
    pub flags: TileFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureSpec {
    pub id: u32,
    pub kind: CreatureKind,
    pub position: (i32, i32, u8),
    /// `(current, maximum)`.
    pub health: (i32, i32),
    #[serde(default)]
    pub mana: (i32, i32),
    #[serde(default)]
    pub master: Option<u32>,
    #[serde(default)]
    pub combat_values: Option<(i32, i32)>,
    #[serde(default)]
    pub immunities: Vec<String>,
    /// Defense the world reports for every hit on this creature.
    #[serde(default)]
    pub block: Option<BlockKind>,
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
    #[serde(default)]
    pub player: Option<PlayerSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub max: i32,
    #[serde(default)]
    pub element: Option<(String, i32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub level: u32,
    pub magic_level: u32,
    #[serde(default)]
    pub skull: Skull,
    #[serde(default)]
    pub flags: PlayerFlags,
    #[serde(default)]
    pub secure_mode: bool,
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub intelligence: i32,
    #[serde(default)]
    pub skills: SpecialSkills,
    /// Equipped weapon, read by skill hooks and weapon-typed travel visuals.
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastSpec {
    /// Name of a definition in the combat registry.
    pub combat: String,
    #[serde(default)]
    pub caster: Option<u32>,
    pub target: CastTarget,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CastTarget {
    Creature(u32),
    Area(i32, i32, u8),
}

fn position((x, y, z): (i32, i32, u8)) -> Position {
    Position::new(x, y, z)
}

impl CreatureSpec {
    fn snapshot(&self) -> LoadResult<CreatureSnapshot> {
        let mut creature = CreatureSnapshot::new(EntityId(self.id), self.kind, position(self.position));
        creature.health = ResourceMeter::new(self.health.0, self.health.1);
        creature.mana = ResourceMeter::new(self.mana.0, self.mana.1);
        creature.master = self.master.map(EntityId);
        creature.combat_values = self.combat_values;
        creature.immunities = self.immunities.iter().try_fold(ConditionSet::empty(), |set, name| {
            let kind: ConditionKind = name
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown immunity {:?}", name))?;
            Ok::<_, anyhow::Error>(set | kind.flag())
        })?;

        if let Some(spec) = &self.player {
            let mut player = PlayerProfile::new(spec.level, spec.magic_level);
            player.skull = spec.skull;
            player.flags = spec.flags;
            player.secure_mode = spec.secure_mode;
            player.strength = spec.strength;
            player.intelligence = spec.intelligence;
            player.skills = spec.skills;
            player.weapon = spec.weapon;
            creature.player = Some(player);
        }
        Ok(creature)
    }

    fn weapon(&self) -> LoadResult<Option<WeaponDamage>> {
        let Some(spec) = &self.weapon else {
            return Ok(None);
        };
        let element = match &spec.element {
            Some((kind, value)) => {
                let kind: DamageKind = kind
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Unknown weapon element {:?}", kind))?;
                DamageComponent::new(kind, *value)
            }
            None => DamageComponent::default(),
        };
        Ok(Some(WeaponDamage { max: spec.max, element }))
    }
}

impl ScenarioSpec {
    /// Builds the in-memory world described by this scenario.
    pub fn build_world(&self) -> LoadResult<MemoryWorld> {
        let mut world = MemoryWorld::new();
        world.set_clock(self.clock_ms);

        for tile in &self.tiles {
            world.insert_tile(position(tile.position), tile.flags);
        }

        for spec in &self.creatures {
            let creature = spec
                .snapshot()
                .with_context(|| format!("Invalid creature {}", spec.id))?;
            let id = creature.id;
            world.insert_creature(creature);
            if let Some(block) = spec.block {
                world.set_block(id, block);
            }
            if let Some(weapon) = spec.weapon().with_context(|| format!("Invalid creature {}", spec.id))? {
                world.set_weapon(id, weapon);
            }
        }

        Ok(world)
    }

    /// Builds the world and resolves the cast in it.
    ///
    /// Rolls are drawn from `oracle`, seeded by the scenario seed and the
    /// caster id.
    pub fn resolve(
        &self,
        registry: &CombatRegistry,
        config: &CombatConfig,
        oracle: &dyn RngOracle,
    ) -> LoadResult<ScenarioOutcome> {
        let combat = registry
            .get(&self.cast.combat)
            .ok_or_else(|| anyhow::anyhow!("Unknown combat {:?}", self.cast.combat))?;
        let mut world = self.build_world()?;
        let scripts = ScriptStack::new(config.script_stack_depth);
        let caster = self.cast.caster.map(EntityId);
        let rolls = RollStream::for_action(oracle, self.seed, 0, self.cast.caster.unwrap_or(0));

        let report = {
            let mut env = CombatEnv::new(&mut world, &AllowAll, config, rolls, &scripts);
            match self.cast.target {
                CastTarget::Creature(target) => combat.do_combat_target(&mut env, caster, EntityId(target)),
                CastTarget::Area(x, y, z) => combat.do_combat_area(&mut env, caster, Position::new(x, y, z)),
            }
        }
        .with_context(|| format!("Failed to resolve {:?}", self.cast.combat))?;

        Ok(ScenarioOutcome { world, report })
    }
}

/// World and report after a scenario cast.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub world: MemoryWorld,
    pub report: CombatReport,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Failed to load scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use combat_core::WorldOracle;

    use super::*;

    const SAMPLE: &str = r#"(
        seed: 9,
        tiles: [
            (position: (10, 10, 7), flags: "PROTECTION_ZONE"),
        ],
        creatures: [
            (
                id: 1,
                kind: Player,
                position: (5, 5, 7),
                health: (400, 500),
                mana: (100, 100),
                player: Some((
                    level: 45,
                    magic_level: 30,
                    skull: White,
                    skills: (critical_chance: 10, critical_amount: 25),
                )),
                weapon: Some((max: 60, element: Some(("ice", -8)))),
            ),
            (
                id: 2,
                kind: Monster,
                position: (10, 10, 7),
                health: (800, 800),
                immunities: ["fire", "poison"],
                block: Some(Armor),
            ),
        ],
        cast: (combat: "great-fireball", caster: Some(1), target: Area(10, 10, 7)),
    )"#;

    #[test]
    fn scenario_builds_world() {
        let scenario = ScenarioLoader::parse(SAMPLE).unwrap();
        assert_eq!(scenario.seed, 9);
        assert!(matches!(scenario.cast.target, CastTarget::Area(10, 10, 7)));

        let world = scenario.build_world().unwrap();
        let tile = world.tile(Position::new(10, 10, 7)).unwrap();
        assert!(tile.has_flag(TileFlags::PROTECTION_ZONE));
        assert_eq!(tile.top_creature(), Some(EntityId(2)));

        let mage = world.creature(EntityId(1)).unwrap();
        let profile = mage.player.unwrap();
        assert_eq!(profile.skull, Skull::White);
        assert_eq!(profile.skills.critical_amount, 25);
        assert_eq!(profile.skills.life_leech_amount, 0);
        assert_eq!(mage.health, ResourceMeter::new(400, 500));

        let monster = world.creature(EntityId(2)).unwrap();
        assert!(monster.is_immune(ConditionKind::Fire));
        assert!(!monster.is_immune(ConditionKind::Energy));
    }

    #[test]
    fn bad_immunity_is_reported() {
        let scenario = ScenarioLoader::parse(
            r#"(
                creatures: [(id: 3, kind: Monster, position: (0, 0, 7), health: (1, 1), immunities: ["lava"])],
                cast: (combat: "x", target: Creature(3)),
            )"#,
        )
        .unwrap();
        let message = format!("{:#}", scenario.build_world().unwrap_err());
        assert!(message.contains("lava"));
    }
}
