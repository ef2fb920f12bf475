//! Locations and their resolution.
//!
//! The world owns [`Location`]s. Everything else refers to them through a
//! [`LocationRef`], obtained by identifier from a [`GameContext`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Identifier of a location, e.g. `"colony:1"` or `"tile:40_12"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        LocationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        LocationId(s.to_string())
    }
}

/// A resolved reference to a location owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationRef {
    id: LocationId,
    name_key: String,
}

impl LocationRef {
    pub fn new(id: impl Into<LocationId>, name_key: impl Into<String>) -> Self {
        LocationRef {
            id: id.into(),
            name_key: name_key.into(),
        }
    }

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    /// Identifier of the location's display name.
    pub fn name_key(&self) -> &str {
        &self.name_key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocationKind {
    Colony,
    Settlement,
    Europe,
    Tile,
    #[default]
    Unknown,
}

/// A location as stored in the world registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name_key: String,
    #[serde(default)]
    pub kind: LocationKind,
}

impl Location {
    pub fn new(id: impl Into<LocationId>, name_key: impl Into<String>, kind: LocationKind) -> Self {
        Location {
            id: id.into(),
            name_key: name_key.into(),
            kind,
        }
    }

    pub fn to_ref(&self) -> LocationRef {
        LocationRef::new(self.id.clone(), self.name_key.clone())
    }
}

/// Resolves location identifiers found in saved data.
pub trait GameContext {
    /// Returns a handle for `id`, or `None` if the context cannot resolve it.
    fn make_location(&self, id: &str) -> Option<LocationRef>;
}

/// Registry of every location in a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WorldFile", into = "WorldFile")]
pub struct World {
    locations: BTreeMap<LocationId, Location>,
}

/// On-disk shape of a [`World`]: `{ "locations": [ ... ] }`.
#[derive(Serialize, Deserialize)]
struct WorldFile {
    #[serde(default)]
    locations: Vec<Location>,
}

impl From<WorldFile> for World {
    fn from(file: WorldFile) -> Self {
        let mut world = World::new();
        for location in file.locations {
            if let Some(old) = world.insert(location) {
                log::warn!("Duplicate location '{}' in world file, keeping the last", old.id);
            }
        }
        world
    }
}

impl From<World> for WorldFile {
    fn from(world: World) -> Self {
        WorldFile {
            locations: world.locations.into_values().collect(),
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a registry from a JSON file.
    pub fn load_json(path: &Path) -> Result<World, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        let world = Self::from_json_str(&contents)?;
        log::info!("Loaded {} locations from {}", world.len(), path.display());
        Ok(world)
    }

    pub fn from_json_str(contents: &str) -> Result<World, WorldError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Adds or replaces a location, returning the one it replaced.
    pub fn insert(&mut self, location: Location) -> Option<Location> {
        self.locations.insert(location.id.clone(), location)
    }

    pub fn get(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }
}

impl GameContext for World {
    fn make_location(&self, id: &str) -> Option<LocationRef> {
        let found = self.locations.get(&LocationId::from(id)).map(Location::to_ref);
        if found.is_none() {
            log::warn!("Unknown location '{}'", id);
        }
        found
    }
}

/// Resolves any non-empty identifier to a placeholder named after itself.
///
/// For tools that read saves without the surrounding game.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderContext;

impl GameContext for PlaceholderContext {
    fn make_location(&self, id: &str) -> Option<LocationRef> {
        if id.is_empty() {
            return None;
        }
        Some(LocationRef::new(id, id))
    }
}
