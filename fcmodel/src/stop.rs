//! A stop along a trade route.

use std::fmt;
use std::io::Write;

use fcxml::{TagKind, XmlError, XmlReader, XmlRecord, XmlWriter};

use crate::goods::AbstractGoods;
use crate::location::{GameContext, LocationRef};

const LOCATION_ATTR: &str = "location";
const GOODS_TO_UNLOAD_TAG: &str = "goodsToUnload";
const GOODS_TO_LOAD_TAG: &str = "goodsToLoad";

/// One waypoint of a [`TradeRoute`](crate::TradeRoute).
///
/// The goods lists are tri-state: `None` means no instruction was ever given,
/// which is not the same as an empty list. Both survive a round trip through
/// XML, since a present list always writes its wrapper element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRouteStop {
    /// Only `None` while reading without a [`GameContext`].
    location: Option<LocationRef>,

    /// Applied in order, before loading.
    goods_to_unload: Option<Vec<AbstractGoods>>,

    goods_to_load: Option<Vec<AbstractGoods>>,
}

impl TradeRouteStop {
    /// A stop at `location` with no loading instructions.
    pub fn new(location: LocationRef) -> Self {
        TradeRouteStop {
            location: Some(location),
            goods_to_unload: None,
            goods_to_load: None,
        }
    }

    pub fn location(&self) -> Option<&LocationRef> {
        self.location.as_ref()
    }

    /// Moves the stop. Reachability is the caller's concern.
    pub fn set_location(&mut self, location: LocationRef) {
        self.location = Some(location);
    }

    pub fn goods_to_load(&self) -> Option<&[AbstractGoods]> {
        self.goods_to_load.as_deref()
    }

    pub fn set_goods_to_load(&mut self, goods: Option<Vec<AbstractGoods>>) {
        self.goods_to_load = goods;
    }

    pub fn goods_to_unload(&self) -> Option<&[AbstractGoods]> {
        self.goods_to_unload.as_deref()
    }

    pub fn set_goods_to_unload(&mut self, goods: Option<Vec<AbstractGoods>>) {
        self.goods_to_unload = goods;
    }

    pub fn tag_name() -> &'static str {
        Self::TAG
    }

    /// Reads a stop into a fresh, location-less record.
    ///
    /// The location is only filled in when `game` is given.
    pub fn from_xml(xr: &mut XmlReader, game: Option<&dyn GameContext>) -> Result<Self, XmlError> {
        let mut stop = TradeRouteStop {
            location: None,
            goods_to_unload: None,
            goods_to_load: None,
        };
        stop.read_from_xml(xr, game)?;
        Ok(stop)
    }

    /// Reads the `tradeRouteStop` element at the cursor into `self`.
    ///
    /// With a `game`, the `location` attribute is resolved through it (an
    /// absent attribute or failed lookup clears the location). Without one
    /// the current location is kept. Each wrapper found replaces its list.
    /// Returns with the cursor on the stop's end tag.
    pub fn read_from_xml(
        &mut self,
        xr: &mut XmlReader,
        game: Option<&dyn GameContext>,
    ) -> Result<(), XmlError> {
        xr.expect_start(Self::TAG)?;
        if let Some(game) = game {
            self.location = xr
                .attribute(LOCATION_ATTR)
                .and_then(|id| game.make_location(id));
        }

        while xr.next_tag()? == TagKind::Start {
            let name = xr.local_name().to_string();
            match name.as_str() {
                GOODS_TO_UNLOAD_TAG => self.goods_to_unload = Some(read_goods_list(xr)?),
                GOODS_TO_LOAD_TAG => self.goods_to_load = Some(read_goods_list(xr)?),
                _ => {
                    log::debug!("Skipping <{}> in <{}>", name, Self::TAG);
                    xr.skip_element()?;
                }
            }
        }
        Ok(())
    }
}

fn read_goods_list(xr: &mut XmlReader) -> Result<Vec<AbstractGoods>, XmlError> {
    let mut goods = Vec::new();
    while xr.next_tag()? == TagKind::Start {
        if xr.local_name() == AbstractGoods::TAG {
            goods.push(AbstractGoods::read_from_xml(xr)?);
        } else {
            log::debug!("Skipping <{}> in goods list", xr.local_name());
            xr.skip_element()?;
        }
    }
    Ok(goods)
}

fn write_goods_list<W: Write>(
    xw: &mut XmlWriter<W>,
    tag: &str,
    goods: Option<&[AbstractGoods]>,
) -> Result<(), XmlError> {
    let Some(goods) = goods else {
        return Ok(());
    };
    xw.write_start_element(tag)?;
    for g in goods {
        g.to_xml(xw)?;
    }
    xw.write_end_element()
}

impl XmlRecord for TradeRouteStop {
    const TAG: &'static str = "tradeRouteStop";

    fn to_xml<W: Write>(&self, xw: &mut XmlWriter<W>) -> Result<(), XmlError> {
        let location = self.location.as_ref().ok_or_else(|| XmlError::MissingAttribute {
            element: Self::TAG.to_string(),
            attribute: LOCATION_ATTR.to_string(),
        })?;
        xw.write_start_element(Self::TAG)?;
        xw.write_attribute(LOCATION_ATTR, location.id().as_str())?;
        write_goods_list(xw, GOODS_TO_UNLOAD_TAG, self.goods_to_unload.as_deref())?;
        write_goods_list(xw, GOODS_TO_LOAD_TAG, self.goods_to_load.as_deref())?;
        xw.write_end_element()
    }
}

/// The location's display-name key, or nothing.
impl fmt::Display for TradeRouteStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => f.write_str(location.name_key()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::PlaceholderContext;
    use crate::testing::{WorldBuilder, goods};
    use fcxml::{WriterConfig, to_xml_string};

    fn jamestown() -> LocationRef {
        LocationRef::new("colony:1", "Jamestown")
    }

    fn parse(s: &str, game: Option<&dyn GameContext>) -> TradeRouteStop {
        let mut xr = XmlReader::new(s).expect("Tokenize");
        xr.next_tag().expect("Root");
        TradeRouteStop::from_xml(&mut xr, game).expect("Read stop")
    }

    #[test]
    fn test_new_stop_has_no_instructions() {
        let stop = TradeRouteStop::new(jamestown());
        assert_eq!(stop.location(), Some(&jamestown()));
        assert!(stop.goods_to_load().is_none());
        assert!(stop.goods_to_unload().is_none());
    }

    #[test]
    fn test_ore_example() {
        let mut stop = TradeRouteStop::new(jamestown());
        stop.set_goods_to_load(Some(vec![goods("ore", 100)]));
        let s = to_xml_string(&stop, WriterConfig::compact()).unwrap();
        assert_eq!(
            s,
            concat!(
                r#"<tradeRouteStop location="colony:1">"#,
                r#"<goodsToLoad><abstractGoods type="ore" amount="100"/></goodsToLoad>"#,
                r#"</tradeRouteStop>"#
            )
        );
    }

    #[test]
    fn test_empty_list_still_writes_wrapper() {
        let mut stop = TradeRouteStop::new(jamestown());
        stop.set_goods_to_unload(Some(Vec::new()));
        let s = to_xml_string(&stop, WriterConfig::compact()).unwrap();
        assert_eq!(
            s,
            r#"<tradeRouteStop location="colony:1"><goodsToUnload/></tradeRouteStop>"#
        );
    }

    #[test]
    fn test_write_without_location_fails() {
        let stop = parse(r#"<tradeRouteStop location="colony:1"/>"#, None);
        assert!(stop.location().is_none());
        assert!(matches!(
            to_xml_string(&stop, WriterConfig::compact()),
            Err(XmlError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_no_wrappers_means_absent() {
        let stop = parse(
            r#"<tradeRouteStop location="colony:1"></tradeRouteStop>"#,
            Some(&PlaceholderContext),
        );
        assert!(stop.goods_to_load().is_none());
        assert!(stop.goods_to_unload().is_none());
    }

    #[test]
    fn test_empty_wrapper_means_empty() {
        let stop = parse(
            r#"<tradeRouteStop location="colony:1"><goodsToLoad/></tradeRouteStop>"#,
            Some(&PlaceholderContext),
        );
        assert_eq!(stop.goods_to_load(), Some(&[][..]));
        assert!(stop.goods_to_unload().is_none());
    }

    #[test]
    fn test_wrappers_in_any_order_keep_entry_order() {
        let xml = r#"
            <tradeRouteStop location="colony:1">
                <goodsToLoad>
                    <abstractGoods type="furs" amount="10"/>
                    <abstractGoods type="ore" amount="20"/>
                    <abstractGoods type="furs" amount="30"/>
                </goodsToLoad>
                <goodsToUnload>
                    <abstractGoods type="tools" amount="5"/>
                </goodsToUnload>
            </tradeRouteStop>"#;
        let stop = parse(xml, Some(&PlaceholderContext));
        assert_eq!(
            stop.goods_to_load().unwrap(),
            &[goods("furs", 10), goods("ore", 20), goods("furs", 30)]
        );
        assert_eq!(stop.goods_to_unload().unwrap(), &[goods("tools", 5)]);
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let xml = r#"
            <tradeRouteStop location="colony:1">
                <orders><goodsToLoad/></orders>
                <goodsToUnload>
                    <comment text="x"><abstractGoods type="a" amount="1"/></comment>
                    <abstractGoods type="b" amount="2"/>
                </goodsToUnload>
                <flag/>
            </tradeRouteStop>"#;
        let stop = parse(xml, Some(&PlaceholderContext));
        assert!(stop.goods_to_load().is_none());
        assert_eq!(stop.goods_to_unload().unwrap(), &[goods("b", 2)]);
    }

    #[test]
    fn test_resolves_location_through_world() {
        let world = WorldBuilder::new()
            .with_colony("colony:1", "Jamestown")
            .build();
        let stop = parse(r#"<tradeRouteStop location="colony:1"/>"#, Some(&world));
        assert_eq!(stop.location(), Some(&jamestown()));
        assert_eq!(stop.to_string(), "Jamestown");

        let stop = parse(r#"<tradeRouteStop location="colony:9"/>"#, Some(&world));
        assert!(stop.location().is_none());
    }

    #[test]
    fn test_read_without_context_keeps_location() {
        let mut stop = TradeRouteStop::new(jamestown());
        let mut xr = XmlReader::new(
            r#"<tradeRouteStop location="colony:7"><goodsToLoad/></tradeRouteStop>"#,
        )
        .unwrap();
        xr.next_tag().unwrap();
        stop.read_from_xml(&mut xr, None).unwrap();
        assert_eq!(stop.location(), Some(&jamestown()));
        assert_eq!(stop.goods_to_load(), Some(&[][..]));
    }

    #[test]
    fn test_reader_stops_at_stop_end() {
        let xml = r#"<route><tradeRouteStop location="a"><goodsToLoad/></tradeRouteStop><next/></route>"#;
        let mut xr = XmlReader::new(xml).unwrap();
        xr.next_tag().unwrap();
        xr.next_tag().unwrap();
        TradeRouteStop::from_xml(&mut xr, Some(&PlaceholderContext)).unwrap();
        assert_eq!(xr.local_name(), "tradeRouteStop");
        assert_eq!(xr.next_tag().unwrap(), TagKind::Start);
        assert_eq!(xr.local_name(), "next");
    }

    #[test]
    fn test_malformed_goods_aborts() {
        let mut xr = XmlReader::new(
            r#"<tradeRouteStop location="a"><goodsToLoad><abstractGoods amount="1"/></goodsToLoad></tradeRouteStop>"#,
        )
        .unwrap();
        xr.next_tag().unwrap();
        assert!(matches!(
            TradeRouteStop::from_xml(&mut xr, Some(&PlaceholderContext)),
            Err(XmlError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_display_empty_without_location() {
        let stop = parse(r#"<tradeRouteStop location="colony:1"/>"#, None);
        assert_eq!(stop.to_string(), "");
        assert_eq!(TradeRouteStop::tag_name(), "tradeRouteStop");
    }
}
