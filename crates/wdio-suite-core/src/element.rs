//! Remote element handles and geometry.
//!
//! These types are independent of any specific backend: the Appium client
//! decodes them from W3C JSON and the in-memory test device builds them directly.

use serde::{Deserialize, Serialize};

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSON-wire element identifier key, still emitted by some Appium drivers.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// An opaque reference to an element resolved in a live session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Extracts the element id from a W3C element object.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .or_else(|| value.get(LEGACY_ELEMENT_KEY))
            .and_then(|v| v.as_str())
            .map(Self::new)
    }
}

/// The position and size of an element in viewport coordinates.
///
/// The origin is the top-left corner of the screen. Appium may report
/// fractional values; they are truncated on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Center point, using integer division like the driver's own tap math.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

impl<'de> Deserialize<'de> for Rect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            x: f64,
            y: f64,
            width: f64,
            height: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Rect {
            x: raw.x as i32,
            y: raw.y as i32,
            width: raw.width as i32,
            height: raw.height as i32,
        })
    }
}
