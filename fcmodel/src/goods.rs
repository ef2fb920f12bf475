//! Goods entries: a goods kind and an amount.

use std::fmt;
use std::io::Write;

use fcxml::{XmlError, XmlReader, XmlRecord, XmlWriter};

/// Identifier of a goods kind, e.g. `"model.goods.ore"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoodsTypeId(pub String);

impl GoodsTypeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GoodsTypeId {
    fn from(s: &str) -> Self {
        GoodsTypeId(s.to_string())
    }
}

impl fmt::Display for GoodsTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity of one kind of goods, not tied to any container.
///
/// Neither the kind nor the sign of the amount is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbstractGoods {
    pub goods_type: GoodsTypeId,
    pub amount: i32,
}

const TYPE_ATTR: &str = "type";
const AMOUNT_ATTR: &str = "amount";

impl AbstractGoods {
    pub fn new(goods_type: impl Into<GoodsTypeId>, amount: i32) -> Self {
        AbstractGoods {
            goods_type: goods_type.into(),
            amount,
        }
    }

    pub fn tag_name() -> &'static str {
        Self::TAG
    }

    /// Reads `<abstractGoods type=".." amount=".."/>` at the cursor.
    ///
    /// Leaves the cursor on the element's end tag; child content is ignored.
    pub fn read_from_xml(xr: &mut XmlReader) -> Result<Self, XmlError> {
        xr.expect_start(Self::TAG)?;
        let goods_type = GoodsTypeId(xr.required_attribute(TYPE_ATTR)?.to_string());
        let amount = xr
            .attribute_as::<i32>(AMOUNT_ATTR)?
            .ok_or_else(|| XmlError::MissingAttribute {
                element: Self::TAG.to_string(),
                attribute: AMOUNT_ATTR.to_string(),
            })?;
        xr.skip_element()?;
        Ok(AbstractGoods { goods_type, amount })
    }
}

impl XmlRecord for AbstractGoods {
    const TAG: &'static str = "abstractGoods";

    fn to_xml<W: Write>(&self, xw: &mut XmlWriter<W>) -> Result<(), XmlError> {
        xw.write_start_element(Self::TAG)?;
        xw.write_attribute(TYPE_ATTR, self.goods_type.as_str())?;
        xw.write_attribute(AMOUNT_ATTR, &self.amount.to_string())?;
        xw.write_end_element()
    }
}

impl fmt::Display for AbstractGoods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.goods_type, self.amount)
    }
}
