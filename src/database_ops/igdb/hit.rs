use serde_json::Value;

use crate::database_ops::models::VideoEntry;

/// One game object from a catalog search response.
///
/// The catalog returns loosely shaped JSON, so each optional field is pulled out on
/// its own: a missing or malformed sub-field becomes `None` instead of failing the
/// whole hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHit {
    pub id: i64,
    pub name: String,
    pub summary: Option<String>,
    /// `cover.cloudinary_id`
    pub cover_id: Option<String>,
    /// `release_dates[0].date`, epoch milliseconds, only when positive.
    pub first_release_ms: Option<i64>,
    /// Only when positive.
    pub rating: Option<f64>,
    pub screenshots: Option<Vec<String>>,
    pub videos: Option<Vec<VideoEntry>>,
}

impl CatalogHit {
    /// Minimal hit with just the required fields; handy for fakes and tests.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            summary: None,
            cover_id: None,
            first_release_ms: None,
            rating: None,
            screenshots: None,
            videos: None,
        }
    }

    /// Decode one element of the response array. Returns `None` when the element has
    /// no integer `id` or no string `name`, since neither a result nor a cache row can
    /// be built without them.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_i64()?;
        let name = value.get("name")?.as_str()?.to_string();
        Some(Self {
            id,
            name,
            summary: value
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string),
            cover_id: value
                .get("cover")
                .and_then(|c| c.get("cloudinary_id"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            first_release_ms: value
                .get("release_dates")
                .and_then(|d| d.get(0))
                .and_then(|d| d.get("date"))
                .and_then(as_epoch_ms)
                .filter(|ms| *ms > 0),
            rating: value
                .get("rating")
                .and_then(Value::as_f64)
                .filter(|r| *r > 0.0),
            screenshots: value
                .get("screenshots")
                .and_then(Value::as_array)
                .map(|shots| {
                    shots
                        .iter()
                        .filter_map(|s| s.get("cloudinary_id").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                }),
            videos: value.get("videos").and_then(Value::as_array).map(|videos| {
                videos
                    .iter()
                    .filter_map(|v| {
                        let link = v.get("video_id").and_then(Value::as_str)?;
                        let title = v.get("name").and_then(Value::as_str).unwrap_or_default();
                        Some(VideoEntry {
                            title: title.to_string(),
                            link: link.to_string(),
                        })
                    })
                    .collect()
            }),
        })
    }
}

fn as_epoch_ms(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
