//! Product of a load: the override tables and group mappings the game reads.
//!
//! Everything here is rebuilt from scratch for each apply pass; see
//! [`GameData::reset`].

use std::collections::HashMap;

use crate::features::CargoSlot;
use crate::features::bridge::{BridgeSpec, NUM_BRIDGES};
use crate::features::globals::GlobalTables;
use crate::features::sound::{SoundEntry, original_sounds};
use crate::features::vehicles::{EngineId, VehicleTables};
use crate::spritegroup::{GroupId, Resolved, Resolver, ScopeResolver, SpriteGroupPool};
use crate::vars::GameTuning;

/// Group used for a wagon when it runs behind one of `engines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagonOverride {
    pub wagon: EngineId,
    pub engines: Vec<EngineId>,
    pub group: GroupId,
}

/// A station registered as custom by a mapping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationRef {
    /// Index of the defining file in the registry.
    pub file: usize,
    pub local_id: u8,
}

#[derive(Debug)]
pub struct GameData {
    pub vehicles: VehicleTables,
    pub bridges: Vec<BridgeSpec>,
    pub globals: GlobalTables,
    pub sounds: Vec<SoundEntry>,
    pub tuning: GameTuning,
    pub groups: SpriteGroupPool,
    /// Id handed to the next raw sprite of a sprite set.
    pub next_custom_sprite: u32,
    pub custom_stations: Vec<StationRef>,
    engine_groups: HashMap<(EngineId, CargoSlot), GroupId>,
    wagon_overrides: Vec<WagonOverride>,
}

impl GameData {
    pub fn new(first_custom_sprite: u32) -> Self {
        Self {
            vehicles: VehicleTables::default(),
            bridges: vec![BridgeSpec::default(); NUM_BRIDGES],
            globals: GlobalTables::default(),
            sounds: original_sounds(),
            tuning: GameTuning::default(),
            groups: SpriteGroupPool::new(),
            next_custom_sprite: first_custom_sprite,
            custom_stations: Vec::new(),
            engine_groups: HashMap::new(),
            wagon_overrides: Vec::new(),
        }
    }

    /// Restore every table to its defaults.
    pub fn reset(&mut self, first_custom_sprite: u32) {
        *self = Self::new(first_custom_sprite);
    }

    pub fn set_engine_group(&mut self, engine: EngineId, cargo: CargoSlot, group: GroupId) {
        self.engine_groups.insert((engine, cargo), group);
    }

    /// Group mapped to `engine` for `cargo`, falling back to the default
    /// slot.
    pub fn engine_group(&self, engine: EngineId, cargo: CargoSlot) -> Option<GroupId> {
        self.engine_groups
            .get(&(engine, cargo))
            .or_else(|| self.engine_groups.get(&(engine, CargoSlot::Default)))
            .copied()
    }

    pub fn set_wagon_override(&mut self, wagon: EngineId, group: GroupId, engines: &[EngineId]) {
        self.wagon_overrides.push(WagonOverride {
            wagon,
            engines: engines.to_vec(),
            group,
        });
    }

    /// Latest override for `wagon` when pulled by `engine`.
    pub fn wagon_override(&self, wagon: EngineId, engine: EngineId) -> Option<GroupId> {
        self.wagon_overrides
            .iter()
            .rev()
            .find(|o| o.wagon == wagon && o.engines.contains(&engine))
            .map(|o| o.group)
    }

    pub fn wagon_overrides(&self) -> &[WagonOverride] {
        &self.wagon_overrides
    }

    /// Resolve the group of `engine` carrying `cargo`. With `head` set, a
    /// wagon override for that engine takes precedence.
    pub fn resolve_engine<S: ScopeResolver>(
        &self,
        engine: EngineId,
        cargo: CargoSlot,
        head: Option<EngineId>,
        scope: S,
    ) -> Resolved {
        let group = head
            .and_then(|head| self.wagon_override(engine, head))
            .or_else(|| self.engine_group(engine, cargo));
        Resolver::new(&self.groups, scope).resolve(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spritegroup::{SpriteGroup, VarScope};

    struct NoVars;

    impl ScopeResolver for NoVars {
        fn variable(&self, _: VarScope, _: u8, _: u8) -> Option<u32> {
            None
        }
    }

    #[test]
    fn engine_groups_fall_back_to_default() {
        let mut data = GameData::new(0x4000);
        let default = data.groups.callback(1);
        let coal = data.groups.callback(2);
        data.set_engine_group(5, CargoSlot::Default, default);
        data.set_engine_group(5, CargoSlot::Cargo(1), coal);

        assert_eq!(data.engine_group(5, CargoSlot::Cargo(1)), Some(coal));
        assert_eq!(data.engine_group(5, CargoSlot::Cargo(7)), Some(default));
        assert_eq!(data.engine_group(6, CargoSlot::Default), None);
    }

    #[test]
    fn wagon_override_wins_behind_matching_engine() {
        let mut data = GameData::new(0x4000);
        let own = data.groups.insert(SpriteGroup::Result { sprite: 0x4000, num_sprites: 4 });
        let over = data.groups.insert(SpriteGroup::Result { sprite: 0x4010, num_sprites: 4 });
        data.set_engine_group(20, CargoSlot::Default, own);
        data.set_wagon_override(20, over, &[3, 4]);

        let behind = data.resolve_engine(20, CargoSlot::Default, Some(4), NoVars);
        assert_eq!(behind, Resolved::Sprite { sprite: 0x4010, num_sprites: 4 });
        let other = data.resolve_engine(20, CargoSlot::Default, Some(9), NoVars);
        assert_eq!(other, Resolved::Sprite { sprite: 0x4000, num_sprites: 4 });
    }

    #[test]
    fn reset_restores_defaults() {
        let mut data = GameData::new(0x4000);
        data.next_custom_sprite = 0x4100;
        data.bridges[0].speed = 99;
        data.groups.callback(3);
        data.reset(0x5000);
        assert_eq!(data.next_custom_sprite, 0x5000);
        assert_eq!(data.bridges[0].speed, 0);
        assert!(data.groups.is_empty());
    }
}
