//! Combat definition loader.
//!
//! Loads named combat definitions from RON data files. Enumerated values
//! (damage kinds, condition kinds, formula kinds, origins) are written as
//! kebab-case strings, e.g. `"life-drain"` or `"level-magic"`.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use combat_core::{
    Combat, CombatParams, Condition, ConditionKind, DamageKind, DirectionalArea, DistanceEffect, FormulaKind,
    FormulaSpec, MagicEffect, OriginKind,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Authoring form of one combat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatDefinitionSpec {
    pub name: String,
    #[serde(default = "none_kind")]
    pub combat_type: String,
    #[serde(default)]
    pub impact_effect: u16,
    #[serde(default)]
    pub distance_effect: u8,
    #[serde(default)]
    pub blocked_by_armor: bool,
    #[serde(default)]
    pub blocked_by_shield: bool,
    #[serde(default)]
    pub target_caster_or_topmost: bool,
    #[serde(default)]
    pub field_item_id: u16,
    #[serde(default = "aggressive_default")]
    pub aggressive: bool,
    #[serde(default)]
    pub dispel: Option<String>,
    #[serde(default)]
    pub use_charges: bool,
    #[serde(default)]
    pub ignore_resistances: bool,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub formula: Option<FormulaSpecRon>,
    #[serde(default)]
    pub area: Option<AreaSpec>,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

fn none_kind() -> String {
    "none".to_string()
}

fn aggressive_default() -> bool {
    true
}

/// Damage formula with a string kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaSpecRon {
    pub kind: String,
    #[serde(default)]
    pub a1: f64,
    #[serde(default)]
    pub b1: f64,
    #[serde(default)]
    pub a2: f64,
    #[serde(default)]
    pub b2: f64,
}

/// Area shapes that can be authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AreaSpec {
    /// North-facing template, optionally with a north-west facing diagonal template.
    Template {
        rows: u32,
        values: Vec<u32>,
        #[serde(default)]
        diagonal: Option<(u32, Vec<u32>)>,
    },
    Cone { length: u32, spread: u32 },
    Circle { radius: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub kind: String,
    pub ticks: i32,
    #[serde(default)]
    pub value: i32,
}

impl CombatDefinitionSpec {
    /// Converts the authoring form into a ready-to-resolve [`Combat`].
    pub fn build(&self) -> LoadResult<Combat> {
        let mut params = CombatParams {
            combat_type: parse_named::<DamageKind>("combat_type", &self.combat_type)?,
            impact_effect: MagicEffect(self.impact_effect),
            distance_effect: DistanceEffect(self.distance_effect),
            blocked_by_armor: self.blocked_by_armor,
            blocked_by_shield: self.blocked_by_shield,
            target_caster_or_topmost: self.target_caster_or_topmost,
            field_item_id: self.field_item_id,
            aggressive: self.aggressive,
            use_charges: self.use_charges,
            ignore_resistances: self.ignore_resistances,
            ..CombatParams::default()
        };
        if let Some(dispel) = &self.dispel {
            params.dispel_type = parse_named::<ConditionKind>("dispel", dispel)?;
        }
        if let Some(origin) = &self.origin {
            params.origin = parse_named::<OriginKind>("origin", origin)?;
        }

        let mut combat = Combat::new(params);

        if let Some(formula) = &self.formula {
            combat.set_formula(FormulaSpec::new(
                parse_named::<FormulaKind>("formula.kind", &formula.kind)?,
                formula.a1,
                formula.b1,
                formula.a2,
                formula.b2,
            ));
        }

        if let Some(area) = &self.area {
            combat.set_area(Some(Arc::new(area.build()?)));
        }

        for condition in &self.conditions {
            let kind = parse_named::<ConditionKind>("conditions.kind", &condition.kind)?;
            combat
                .add_condition(Condition::new(kind, condition.ticks, condition.value))
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }

        Ok(combat)
    }
}

impl AreaSpec {
    pub fn build(&self) -> LoadResult<DirectionalArea> {
        let area = match self {
            AreaSpec::Template { rows, values, diagonal } => {
                let area = DirectionalArea::from_template(values, *rows)?;
                match diagonal {
                    Some((diagonal_rows, diagonal_values)) => area.with_diagonals(diagonal_values, *diagonal_rows)?,
                    None => area,
                }
            }
            AreaSpec::Cone { length, spread } => DirectionalArea::cone(*length, *spread)?,
            AreaSpec::Circle { radius } => DirectionalArea::circle(*radius),
        };
        Ok(area)
    }
}

fn parse_named<T: FromStr>(field: &str, value: &str) -> LoadResult<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown value {:?} for {}", value, field))
}

/// Registry of combats keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CombatRegistry {
    combats: BTreeMap<String, Combat>,
}

impl CombatRegistry {
    pub fn get(&self, name: &str) -> Option<&Combat> {
        self.combats.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.combats.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.combats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combats.is_empty()
    }
}

/// Loader for combat definitions from RON files.
pub struct CombatLoader;

impl CombatLoader {
    /// Load all combat definitions from a RON file containing a list of specs.
    pub fn load(path: &Path) -> LoadResult<CombatRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Failed to load combats from {}", path.display()))
    }

    /// Parse combat definitions from RON text.
    ///
    /// Names must be unique.
    pub fn parse(content: &str) -> LoadResult<CombatRegistry> {
        let specs: Vec<CombatDefinitionSpec> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse combats RON: {}", e))?;

        let mut combats = BTreeMap::new();
        for spec in specs {
            let combat = spec
                .build()
                .with_context(|| format!("Invalid combat definition {:?}", spec.name))?;
            if combats.insert(spec.name.clone(), combat).is_some() {
                anyhow::bail!("Duplicate combat definition {:?}", spec.name);
            }
        }

        tracing::debug!(count = combats.len(), "combat definitions loaded");
        Ok(CombatRegistry { combats })
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{CombatParam, Direction};

    use super::*;

    const SAMPLE: &str = r#"[
        (
            name: "great-fireball",
            combat_type: "fire",
            impact_effect: 7,
            distance_effect: 4,
            formula: Some((kind: "level-magic", a1: -1.2, b1: 0.0, a2: -2.0, b2: 0.0)),
            area: Some(Circle(radius: 3)),
        ),
        (
            name: "energy-wave",
            combat_type: "energy",
            area: Some(Cone(length: 5, spread: 3)),
            conditions: [(kind: "energy", ticks: 4000, value: -25)],
        ),
        (
            name: "cure-poison",
            aggressive: false,
            dispel: Some("poison"),
        ),
    ]"#;

    #[test]
    fn sample_definitions_build() {
        let registry = CombatLoader::parse(SAMPLE).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["cure-poison", "energy-wave", "great-fireball"]
        );

        let fireball = registry.get("great-fireball").unwrap();
        assert_eq!(fireball.params().combat_type, DamageKind::Fire);
        assert_eq!(fireball.formula().kind, FormulaKind::LevelMagic);
        assert!(fireball.area().is_some_and(|area| !area.has_diagonals()));

        let wave = registry.get("energy-wave").unwrap();
        assert_eq!(wave.params().conditions.len(), 1);
        assert!(wave.area().and_then(|area| area.shape(Direction::West)).is_some());

        let cure = registry.get("cure-poison").unwrap();
        assert_eq!(cure.param(CombatParam::Aggressive), 0);
        assert_eq!(cure.params().dispel_type, ConditionKind::Poison);
    }

    #[test]
    fn unknown_damage_kind_names_the_definition() {
        let err = CombatLoader::parse(r#"[(name: "bad", combat_type: "plasma")]"#).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("bad"));
        assert!(message.contains("plasma"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = CombatLoader::parse(r#"[(name: "twice"), (name: "twice")]"#).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }
}
