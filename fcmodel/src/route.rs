//! Trade routes: the owners of stops.

use std::fmt;
use std::io::Write;

use fcxml::{TagKind, XmlError, XmlReader, XmlRecord, XmlWriter};

use crate::error::RouteError;
use crate::location::GameContext;
use crate::stop::TradeRouteStop;

const ID_ATTR: &str = "id";
const NAME_ATTR: &str = "name";
const OWNER_ATTR: &str = "owner";

/// A named, ordered list of stops a carrier visits in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRoute {
    pub id: String,
    pub name: String,
    /// Identifier of the owning player, if known.
    pub owner: Option<String>,
    stops: Vec<TradeRouteStop>,
}

impl TradeRoute {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        TradeRoute {
            id: id.into(),
            name: name.into(),
            owner: None,
            stops: Vec::new(),
        }
    }

    pub fn tag_name() -> &'static str {
        Self::TAG
    }

    pub fn stops(&self) -> &[TradeRouteStop] {
        &self.stops
    }

    pub fn stops_mut(&mut self) -> &mut [TradeRouteStop] {
        &mut self.stops
    }

    pub fn add_stop(&mut self, stop: TradeRouteStop) {
        self.stops.push(stop);
    }

    /// Inserts before `index`; an index past the end appends.
    pub fn insert_stop(&mut self, index: usize, stop: TradeRouteStop) {
        let index = index.min(self.stops.len());
        self.stops.insert(index, stop);
    }

    pub fn remove_stop(&mut self, index: usize) -> Option<TradeRouteStop> {
        if index < self.stops.len() {
            Some(self.stops.remove(index))
        } else {
            None
        }
    }

    pub fn clear_stops(&mut self) {
        self.stops.clear();
    }

    /// Checks the route can be assigned to a carrier.
    pub fn verify(&self) -> Result<(), RouteError> {
        if self.name.trim().is_empty() {
            return Err(RouteError::MissingName);
        }
        if self.stops.len() < 2 {
            return Err(RouteError::TooFewStops {
                name: self.name.clone(),
                count: self.stops.len(),
            });
        }
        if let Some(index) = self.stops.iter().position(|s| s.location().is_none()) {
            return Err(RouteError::StopWithoutLocation {
                name: self.name.clone(),
                index,
            });
        }
        Ok(())
    }

    /// Reads the `tradeRoute` element at the cursor, stops included.
    ///
    /// Stop locations are resolved through `game` when given.
    pub fn from_xml(xr: &mut XmlReader, game: Option<&dyn GameContext>) -> Result<Self, XmlError> {
        xr.expect_start(Self::TAG)?;
        let mut route = TradeRoute::new(
            xr.required_attribute(ID_ATTR)?,
            xr.required_attribute(NAME_ATTR)?,
        );
        route.owner = xr.attribute(OWNER_ATTR).map(str::to_string);

        while xr.next_tag()? == TagKind::Start {
            if xr.local_name() == TradeRouteStop::TAG {
                route.stops.push(TradeRouteStop::from_xml(xr, game)?);
            } else {
                log::debug!("Skipping <{}> in <{}>", xr.local_name(), Self::TAG);
                xr.skip_element()?;
            }
        }
        log::debug!("Read trade route '{}' with {} stops", route.name, route.stops.len());
        Ok(route)
    }
}

impl XmlRecord for TradeRoute {
    const TAG: &'static str = "tradeRoute";

    fn to_xml<W: Write>(&self, xw: &mut XmlWriter<W>) -> Result<(), XmlError> {
        xw.write_start_element(Self::TAG)?;
        xw.write_attribute(ID_ATTR, &self.id)?;
        xw.write_attribute(NAME_ATTR, &self.name)?;
        if let Some(owner) = &self.owner {
            xw.write_attribute(OWNER_ATTR, owner)?;
        }
        for stop in &self.stops {
            stop.to_xml(xw)?;
        }
        xw.write_end_element()
    }
}

impl fmt::Display for TradeRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationRef, PlaceholderContext};
    use crate::testing::{WorldBuilder, goods, route_through};
    use fcxml::{WriterConfig, to_xml_string};

    fn stop(id: &str) -> TradeRouteStop {
        TradeRouteStop::new(LocationRef::new(id, id))
    }

    #[test]
    fn test_insert_and_remove() {
        let mut route = TradeRoute::new("route:1", "Fur run");
        route.add_stop(stop("a"));
        route.add_stop(stop("c"));
        route.insert_stop(1, stop("b"));
        route.insert_stop(99, stop("d"));
        let names: Vec<String> = route.stops().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);

        assert_eq!(route.remove_stop(0).map(|s| s.to_string()), Some("a".to_string()));
        assert!(route.remove_stop(3).is_none());
        assert_eq!(route.stops().len(), 3);

        route.clear_stops();
        assert!(route.stops().is_empty());
    }

    #[test]
    fn test_verify() {
        let mut route = TradeRoute::new("route:1", "");
        assert_eq!(route.verify(), Err(RouteError::MissingName));

        route.name = "Ore".to_string();
        route.add_stop(stop("a"));
        assert_eq!(
            route.verify(),
            Err(RouteError::TooFewStops {
                name: "Ore".to_string(),
                count: 1
            })
        );

        route.add_stop(stop("b"));
        assert_eq!(route.verify(), Ok(()));
    }

    #[test]
    fn test_verify_catches_unresolved_stop() {
        let xml = r#"<tradeRoute id="r" name="Ore">
            <tradeRouteStop location="colony:1"/>
            <tradeRouteStop location="colony:404"/>
        </tradeRoute>"#;
        let world = WorldBuilder::new()
            .with_colony("colony:1", "Jamestown")
            .build();
        let mut xr = XmlReader::new(xml).unwrap();
        xr.next_tag().unwrap();
        let route = TradeRoute::from_xml(&mut xr, Some(&world)).unwrap();
        assert_eq!(
            route.verify(),
            Err(RouteError::StopWithoutLocation {
                name: "Ore".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let world = WorldBuilder::new()
            .with_colony("colony:1", "Jamestown")
            .with_europe()
            .build();
        let mut route = route_through(&world, "route:7", "Tobacco & furs");
        route.owner = Some("player:2".to_string());
        route.stops_mut()[0].set_goods_to_load(Some(vec![goods("tobacco", 100)]));
        route.stops_mut()[1].set_goods_to_unload(Some(Vec::new()));

        let s = to_xml_string(&route, WriterConfig::default()).unwrap();
        let mut xr = XmlReader::new(&s).unwrap();
        xr.next_tag().unwrap();
        let back = TradeRoute::from_xml(&mut xr, Some(&world)).unwrap();
        assert_eq!(back, route);
    }

    #[test]
    fn test_missing_name_attribute() {
        let mut xr = XmlReader::new(r#"<tradeRoute id="r"/>"#).unwrap();
        xr.next_tag().unwrap();
        assert!(matches!(
            TradeRoute::from_xml(&mut xr, Some(&PlaceholderContext)),
            Err(XmlError::MissingAttribute { .. })
        ));
    }
}
