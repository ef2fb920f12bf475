//! # Colony Game Model: Trade Routes
//!
//! The slice of the game model that trade routes need.
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`TradeRoute`] | Named, owned, ordered list of stops |
//! | [`TradeRouteStop`] | One waypoint: location plus goods to unload and load |
//! | [`StopEdit`] | Editing wrapper tracking whether a stop was changed |
//! | [`AbstractGoods`] | A goods kind and an amount |
//! | [`LocationRef`] | Handle to a location owned by the world |
//! | [`GameContext`] | Resolves location identifiers while reading saves |
//!
//! Stops never own their location. They hold a [`LocationRef`] obtained from
//! a [`GameContext`], typically a [`World`] registry.

pub mod edit;
pub mod error;
pub mod goods;
pub mod location;
pub mod route;
pub mod stop;
pub mod testing;

pub use edit::StopEdit;
pub use error::{RouteError, WorldError};
pub use goods::{AbstractGoods, GoodsTypeId};
pub use location::{
    GameContext, Location, LocationId, LocationKind, LocationRef, PlaceholderContext, World,
};
pub use route::TradeRoute;
pub use stop::TradeRouteStop;
