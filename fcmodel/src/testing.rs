//! Builders for tests and tools.

use crate::goods::AbstractGoods;
use crate::location::{Location, LocationKind, World};
use crate::route::TradeRoute;
use crate::stop::TradeRouteStop;

pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    pub fn with_location(mut self, id: &str, name_key: &str, kind: LocationKind) -> Self {
        self.world.insert(Location::new(id, name_key, kind));
        self
    }

    pub fn with_colony(self, id: &str, name_key: &str) -> Self {
        self.with_location(id, name_key, LocationKind::Colony)
    }

    pub fn with_europe(self) -> Self {
        self.with_location("europe", "model.europe.name", LocationKind::Europe)
    }

    pub fn build(self) -> World {
        self.world
    }
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for an [`AbstractGoods`].
pub fn goods(kind: &str, amount: i32) -> AbstractGoods {
    AbstractGoods::new(kind, amount)
}

/// A route visiting each known location of `world` once, in id order, without instructions.
pub fn route_through(world: &World, id: &str, name: &str) -> TradeRoute {
    let mut route = TradeRoute::new(id, name);
    for location in world.iter() {
        route.add_stop(TradeRouteStop::new(location.to_ref()));
    }
    route
}
