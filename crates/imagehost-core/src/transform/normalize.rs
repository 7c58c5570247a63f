//! Draft normalization.
//!
//! [`build`] turns a sparse [`TransformDraft`] into the minimal payload the
//! transform backend accepts. A transformation is only present in the output
//! if the user meaningfully specified it:
//!
//! | Kind    | Included when                              |
//! |---------|--------------------------------------------|
//! | resize  | width or height is non-blank and parses    |
//! | crop    | width and height both parse as positive    |
//! | rotate  | rotation is not 0                          |
//! | format  | a target format was chosen                 |
//! | filters | at least one filter is on (only true keys) |

use serde::{Deserialize, Serialize};

use super::draft::{FilterFlags, OutputFormat, Rotation, TransformDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCrop {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Enabled filters only. Disabled flags are omitted, never sent as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedFilters {
    #[serde(default, skip_serializing_if = "is_false")]
    pub grayscale: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sepia: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// The submitted form of a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<NormalizedResize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<NormalizedCrop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Rotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<NormalizedFilters>,
}

impl NormalizedSpec {
    /// An empty spec is a no-op transform and is rejected before any request.
    pub fn is_empty(&self) -> bool {
        self.resize.is_none()
            && self.crop.is_none()
            && self.rotate.is_none()
            && self.format.is_none()
            && self.filters.is_none()
    }
}

/// Body of `POST /images/{id}/transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub transformations: NormalizedSpec,
}

/// Normalize a draft. Pure; never fails.
pub fn build(draft: &TransformDraft) -> NormalizedSpec {
    NormalizedSpec {
        resize: normalize_resize(draft),
        crop: normalize_crop(draft),
        rotate: Some(draft.rotate()).filter(|r| !r.is_none()),
        format: draft.format(),
        filters: normalize_filters(draft.filters()),
    }
}

fn normalize_resize(draft: &TransformDraft) -> Option<NormalizedResize> {
    let resize = draft.resize();
    if is_blank(&resize.width) && is_blank(&resize.height) {
        return None;
    }
    // Missing dimensions stay missing so the backend can keep the aspect ratio.
    let width = parse_positive(&resize.width);
    let height = parse_positive(&resize.height);
    if width.is_none() && height.is_none() {
        return None;
    }
    Some(NormalizedResize { width, height })
}

fn normalize_crop(draft: &TransformDraft) -> Option<NormalizedCrop> {
    let crop = draft.crop();
    if is_blank(&crop.width) || is_blank(&crop.height) {
        return None;
    }
    // A crop with an unusable dimension is dropped entirely, never sent partially.
    Some(NormalizedCrop {
        width: parse_positive(&crop.width)?,
        height: parse_positive(&crop.height)?,
        x: parse_offset(&crop.x),
        y: parse_offset(&crop.y),
    })
}

fn normalize_filters(flags: FilterFlags) -> Option<NormalizedFilters> {
    flags.any().then_some(NormalizedFilters {
        grayscale: flags.grayscale,
        sepia: flags.sepia,
    })
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Parse the leading integer of `text`, the way form inputs are read:
/// leading whitespace and a sign are accepted, trailing garbage is ignored
/// (`"12px"` is 12, `"7.9"` is 7), and no leading digits means no value.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Strictly positive dimension, or `None`.
fn parse_positive(text: &str) -> Option<u32> {
    parse_int_prefix(text)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

/// Non-negative offset; blank, invalid or negative input becomes 0.
fn parse_offset(text: &str) -> u32 {
    parse_int_prefix(text)
        .filter(|v| *v >= 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::draft::Filter;
    use serde_json::json;

    #[test]
    fn test_empty_draft_yields_empty_spec() {
        let spec = build(&TransformDraft::new());
        assert!(spec.is_empty());
        assert_eq!(serde_json::to_value(spec).unwrap(), json!({}));
    }

    #[test]
    fn test_rotate_zero_is_never_sent() {
        let draft = TransformDraft::new().with_rotate(Rotation::None);
        assert!(build(&draft).is_empty());
    }

    #[test]
    fn test_resize_width_only() {
        let draft = TransformDraft::new().with_resize_width("800");
        let spec = build(&draft);
        assert_eq!(
            spec.resize,
            Some(NormalizedResize {
                width: Some(800),
                height: None
            })
        );
        assert_eq!(
            serde_json::to_value(spec).unwrap(),
            json!({"resize": {"width": 800}})
        );
    }

    #[test]
    fn test_resize_with_only_invalid_values_is_dropped() {
        let draft = TransformDraft::new()
            .with_resize_width("abc")
            .with_resize_height("0");
        assert_eq!(build(&draft).resize, None);
    }

    #[test]
    fn test_resize_ignores_aspect_ratio_flag() {
        let draft = TransformDraft::new()
            .with_resize_height("600")
            .with_maintain_aspect_ratio(false);
        assert_eq!(
            serde_json::to_value(build(&draft)).unwrap(),
            json!({"resize": {"height": 600}})
        );
    }

    #[test]
    fn test_crop_requires_both_dimensions() {
        let width_only = TransformDraft::new().with_crop_width("100");
        assert_eq!(build(&width_only).crop, None);

        let height_only = TransformDraft::new().with_crop_height("100");
        assert_eq!(build(&height_only).crop, None);
    }

    #[test]
    fn test_crop_offsets_default_to_zero() {
        let draft = TransformDraft::new()
            .with_crop_width("100")
            .with_crop_height("50");
        assert_eq!(
            build(&draft).crop,
            Some(NormalizedCrop {
                width: 100,
                height: 50,
                x: 0,
                y: 0
            })
        );
    }

    #[test]
    fn test_crop_with_offsets() {
        let draft = TransformDraft::new()
            .with_crop_width("100")
            .with_crop_height("50")
            .with_crop_x("10")
            .with_crop_y("-4");
        assert_eq!(
            serde_json::to_value(build(&draft)).unwrap(),
            json!({"crop": {"width": 100, "height": 50, "x": 10, "y": 0}})
        );
    }

    #[test]
    fn test_crop_with_unparseable_dimension_is_dropped() {
        let draft = TransformDraft::new()
            .with_crop_width("wide")
            .with_crop_height("50");
        assert_eq!(build(&draft).crop, None);
    }

    #[test]
    fn test_filters_only_true_keys() {
        let draft = TransformDraft::new().with_filter(Filter::Sepia, true);
        assert_eq!(
            serde_json::to_value(build(&draft)).unwrap(),
            json!({"filters": {"sepia": true}})
        );
    }

    #[test]
    fn test_rotate_format_and_filter_scenario() {
        let draft = TransformDraft::new()
            .with_rotate(Rotation::Deg90)
            .with_format(Some(OutputFormat::Webp))
            .with_filter(Filter::Grayscale, true)
            .with_filter(Filter::Sepia, false);
        let request = TransformRequest {
            transformations: build(&draft),
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "transformations": {
                    "rotate": 90,
                    "format": "webp",
                    "filters": {"grayscale": true}
                }
            })
        );
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  42"), Some(42));
        assert_eq!(parse_int_prefix("12px"), Some(12));
        assert_eq!(parse_int_prefix("7.9"), Some(7));
        assert_eq!(parse_int_prefix("+5"), Some(5));
        assert_eq!(parse_int_prefix("-5"), Some(-5));
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("px12"), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn test_parse_positive_rejects_zero_negative_and_overflow() {
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-3"), None);
        assert_eq!(parse_positive("99999999999"), None);
        assert_eq!(parse_positive("1"), Some(1));
    }

    #[test]
    fn test_normalized_spec_round_trips_from_backend_shape() {
        let spec: NormalizedSpec =
            serde_json::from_str(r#"{"rotate": 180, "filters": {"grayscale": true}}"#).unwrap();
        assert_eq!(spec.rotate, Some(Rotation::Deg180));
        assert_eq!(
            spec.filters,
            Some(NormalizedFilters {
                grayscale: true,
                sepia: false
            })
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
