//! The user-editable transformation draft.
//!
//! A draft mirrors the transform form one-to-one: numeric fields hold the raw
//! text the user typed (possibly empty), while rotation, format and filters
//! are closed choices. Drafts are immutable values; every `with_*` method
//! returns an edited copy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Quarter-turn rotation choices offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation. Never transmitted.
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Map a degree value to a rotation. Only exact quarter turns are valid.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Rotation::None
    }
}

impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let degrees = i32::deserialize(deserializer)?;
        Rotation::from_degrees(degrees).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "rotation must be 0, 90, 180 or 270, got {degrees}"
            ))
        })
    }
}

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

/// Named filters. Each is independently on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Grayscale,
    Sepia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterFlags {
    pub grayscale: bool,
    pub sepia: bool,
}

impl FilterFlags {
    pub fn get(self, filter: Filter) -> bool {
        match filter {
            Filter::Grayscale => self.grayscale,
            Filter::Sepia => self.sepia,
        }
    }

    pub fn with(mut self, filter: Filter, enabled: bool) -> Self {
        match filter {
            Filter::Grayscale => self.grayscale = enabled,
            Filter::Sepia => self.sepia = enabled,
        }
        self
    }

    pub fn any(self) -> bool {
        self.grayscale || self.sepia
    }
}

/// Resize fields as typed. Either may be blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDraft {
    pub width: String,
    pub height: String,
    /// UI hint for linking the two inputs; the backend infers the missing
    /// dimension on its own, so this is never sent.
    pub maintain_aspect_ratio: bool,
}

impl Default for ResizeDraft {
    fn default() -> Self {
        Self {
            width: String::new(),
            height: String::new(),
            maintain_aspect_ratio: true,
        }
    }
}

/// Crop fields as typed. Offsets may be blank and default to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropDraft {
    pub width: String,
    pub height: String,
    pub x: String,
    pub y: String,
}

/// Sparse, in-progress transformation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformDraft {
    resize: ResizeDraft,
    crop: CropDraft,
    rotate: Rotation,
    format: Option<OutputFormat>,
    filters: FilterFlags,
}

impl TransformDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resize(&self) -> &ResizeDraft {
        &self.resize
    }

    pub fn crop(&self) -> &CropDraft {
        &self.crop
    }

    pub fn rotate(&self) -> Rotation {
        self.rotate
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn filters(&self) -> FilterFlags {
        self.filters
    }

    /// True when every field is at its default.
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_resize_width(mut self, value: impl Into<String>) -> Self {
        self.resize.width = value.into();
        self
    }

    pub fn with_resize_height(mut self, value: impl Into<String>) -> Self {
        self.resize.height = value.into();
        self
    }

    pub fn with_maintain_aspect_ratio(mut self, keep: bool) -> Self {
        self.resize.maintain_aspect_ratio = keep;
        self
    }

    pub fn with_crop_width(mut self, value: impl Into<String>) -> Self {
        self.crop.width = value.into();
        self
    }

    pub fn with_crop_height(mut self, value: impl Into<String>) -> Self {
        self.crop.height = value.into();
        self
    }

    pub fn with_crop_x(mut self, value: impl Into<String>) -> Self {
        self.crop.x = value.into();
        self
    }

    pub fn with_crop_y(mut self, value: impl Into<String>) -> Self {
        self.crop.y = value.into();
        self
    }

    pub fn with_rotate(mut self, rotation: Rotation) -> Self {
        self.rotate = rotation;
        self
    }

    /// `None` keeps the original format.
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: Filter, enabled: bool) -> Self {
        self.filters = self.filters.with(filter, enabled);
        self
    }

    pub fn toggle_filter(self, filter: Filter) -> Self {
        let enabled = !self.filters.get(filter);
        self.with_filter(filter, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_is_pristine() {
        let draft = TransformDraft::new();
        assert!(draft.is_pristine());
        assert!(draft.resize().maintain_aspect_ratio);
        assert_eq!(draft.rotate(), Rotation::None);
        assert_eq!(draft.format(), None);
        assert!(!draft.filters().any());
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let original = TransformDraft::new();
        let edited = original.clone().with_resize_width("800");
        assert!(original.is_pristine());
        assert_eq!(edited.resize().width, "800");
        assert!(!edited.is_pristine());
    }

    #[test]
    fn test_toggle_filter() {
        let draft = TransformDraft::new().toggle_filter(Filter::Sepia);
        assert!(draft.filters().sepia);
        assert!(!draft.filters().grayscale);

        let draft = draft.toggle_filter(Filter::Sepia);
        assert!(!draft.filters().sepia);
    }

    #[test]
    fn test_rotation_degrees() {
        for rotation in Rotation::ALL {
            assert_eq!(
                Rotation::from_degrees(rotation.degrees() as i32),
                Some(rotation)
            );
        }
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(-90), None);
    }

    #[test]
    fn test_rotation_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Rotation::Deg270).unwrap(), "270");
        let parsed: Rotation = serde_json::from_str("180").unwrap();
        assert_eq!(parsed, Rotation::Deg180);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("webp".parse::<OutputFormat>(), Ok(OutputFormat::Webp));
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!(" png ".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(serde_json::to_string(&OutputFormat::Jpeg).unwrap(), "\"jpeg\"");
    }
}
