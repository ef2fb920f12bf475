//! Editing state for a stop.
//!
//! Whether a stop has been changed matters only to the route editor, so the
//! flag lives here rather than on [`TradeRouteStop`], and never reaches a save.

use crate::goods::AbstractGoods;
use crate::location::LocationRef;
use crate::stop::TradeRouteStop;

/// A stop being edited, plus whether it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEdit {
    stop: TradeRouteStop,
    modified: bool,
}

impl StopEdit {
    pub fn new(stop: TradeRouteStop) -> Self {
        StopEdit {
            stop,
            modified: false,
        }
    }

    pub fn stop(&self) -> &TradeRouteStop {
        &self.stop
    }

    pub fn into_stop(self) -> TradeRouteStop {
        self.stop
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn set_location(&mut self, location: LocationRef) {
        self.stop.set_location(location);
        self.modified = true;
    }

    pub fn set_goods_to_load(&mut self, goods: Option<Vec<AbstractGoods>>) {
        self.stop.set_goods_to_load(goods);
        self.modified = true;
    }

    pub fn set_goods_to_unload(&mut self, goods: Option<Vec<AbstractGoods>>) {
        self.stop.set_goods_to_unload(goods);
        self.modified = true;
    }
}

impl From<TradeRouteStop> for StopEdit {
    fn from(stop: TradeRouteStop) -> Self {
        StopEdit::new(stop)
    }
}
