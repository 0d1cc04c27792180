use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_aux::prelude::*;

use crate::unescape::{self, UnescapeError};

// The watch page embeds the player configuration as a JSON string value
// inside the script block that follows the player-api element, so every
// quote in it appears escaped (`formats\":[...`). The markers below are
// coupled to that exact textual shape; when the page changes, they are the
// only thing that needs updating.
const PLAYER_API_MARKER: &str = r#"id="player-api""#;
const SCRIPT_END: &str = "</script>";
const FORMATS_LABEL: &str = r#"formats\":["#;
const FORMATS_END: &str = "],";
const ADAPTIVE_FORMATS_LABEL: &str = r#"adaptiveFormats\":["#;
const ADAPTIVE_FORMATS_END: &str = "]}";

/// One stream advertised by the player configuration.
///
/// `url` is missing on formats that need separate signature decoding; those
/// parse fine but cannot be downloaded. Fields this crate has no use for are
/// ignored by serde.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub itag: i64,
    pub mime_type: String,
    pub url: Option<String>,
    pub height: Option<i64>,
    pub average_bitrate: Option<i64>,
    pub quality_label: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub content_length: Option<i64>,
}

/// The two format lists sliced out of the player configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSet {
    /// Progressive (combined audio+video) formats. Parsed for diagnostics,
    /// not used for stream selection.
    pub formats: Vec<StreamDescriptor>,
    /// Single-media-type formats, the operative set.
    pub adaptive_formats: Vec<StreamDescriptor>,
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("marker not found: {0}")]
    MissingMarker(&'static str),
    #[error("could not unescape {array} array: {source}")]
    Unescape {
        array: &'static str,
        source: UnescapeError,
    },
    #[error("could not parse {array} array: {source}")]
    Parse {
        array: &'static str,
        source: serde_json::Error,
    },
}

/// Returns the text after the script block marked by the player-api element.
fn player_api_region(html: &str) -> Result<&str, ExtractionError> {
    let idx_marker = html
        .find(PLAYER_API_MARKER)
        .ok_or(ExtractionError::MissingMarker("player-api"))?
        + PLAYER_API_MARKER.len();
    let idx_end = html[idx_marker..]
        .find(SCRIPT_END)
        .ok_or(ExtractionError::MissingMarker("</script>"))?
        + idx_marker
        + SCRIPT_END.len();

    Ok(&html[idx_end..])
}

/// Slices one raw array body (without brackets) out of the region, by
/// literal label and closing pattern.
fn slice_array_body<'a>(
    region: &'a str,
    label: &str,
    end: &str,
    name: &'static str,
    end_name: &'static str,
) -> Result<&'a str, ExtractionError> {
    let idx_start = region
        .find(label)
        .ok_or(ExtractionError::MissingMarker(name))?
        + label.len();
    let idx_end = region[idx_start..]
        .find(end)
        .ok_or(ExtractionError::MissingMarker(end_name))?
        + idx_start;

    Ok(&region[idx_start..idx_end])
}

/// Unescapes a raw array body and parses it as a JSON array of descriptors.
/// An empty body is a valid, empty list.
fn parse_array(body: &str, array: &'static str) -> Result<Vec<StreamDescriptor>, ExtractionError> {
    let unescaped =
        unescape::unescape(body).map_err(|source| ExtractionError::Unescape { array, source })?;

    serde_json::from_str(&format!("[{}]", unescaped))
        .map_err(|source| ExtractionError::Parse { array, source })
}

impl FormatSet {
    pub fn from_html(html: &str) -> Result<Self, ExtractionError> {
        let region = player_api_region(html)?;

        let formats = parse_array(
            slice_array_body(
                region,
                FORMATS_LABEL,
                FORMATS_END,
                "formats",
                "end of formats",
            )?,
            "formats",
        )?;
        let adaptive_formats = parse_array(
            slice_array_body(
                region,
                ADAPTIVE_FORMATS_LABEL,
                ADAPTIVE_FORMATS_END,
                "adaptiveFormats",
                "end of adaptiveFormats",
            )?,
            "adaptiveFormats",
        )?;

        Ok(Self {
            formats,
            adaptive_formats,
        })
    }
}

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>(.*?)</title>").unwrap());

/// Extracts the page title, scanning line by line.
pub fn title(html: &str) -> Option<String> {
    html.lines()
        .find_map(|line| TITLE_REGEX.captures(line))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // A synthetic watch page with the same textual shape as the real thing:
    // one progressive format and two adaptive ones, all escaped once.
    fn test_page() -> String {
        let mut page = String::new();
        page.push_str("<html><head>\n");
        page.push_str("<meta><title>My Cool Video - Youtube</title></head>\n");
        page.push_str(r#"<div id="player-api"></div><script>var cfg = 1;</script>"#);
        page.push_str(r#"more stuff {\"streamingData\":{\"formats\":["#);
        page.push_str(r#"{\"itag\":18,\"mimeType\":\"video\/mp4\",\"url\":\"http:\/\/x\/p\",\"height\":360}"#);
        page.push_str(r#"],\"adaptiveFormats\":["#);
        page.push_str(r#"{\"itag\":137,\"mimeType\":\"video\/mp4\",\"height\":1080,\"url\":\"http:\/\/x\/v?a=1&b=2\",\"contentLength\":\"1234\"},"#);
        page.push_str(r#"{\"itag\":140,\"mimeType\":\"audio\/mp4\",\"averageBitrate\":128000,\"url\":\"http:\/\/x\/a\"}"#);
        page.push_str(r#"]}}"#);
        page.push_str("</html>\n");
        page
    }

    #[test]
    fn parses_both_arrays() {
        let set = FormatSet::from_html(&test_page()).expect("Could not extract format set");

        assert_eq!(set.formats.len(), 1);
        assert_eq!(set.formats[0].itag, 18);
        assert_eq!(set.formats[0].height, Some(360));

        assert_eq!(set.adaptive_formats.len(), 2);
        let video = &set.adaptive_formats[0];
        assert_eq!(video.itag, 137);
        assert_eq!(video.mime_type, "video/mp4");
        assert_eq!(video.height, Some(1080));
        // & and \/ unescaped, string-encoded contentLength parsed
        assert_eq!(video.url.as_deref(), Some("http://x/v?a=1&b=2"));
        assert_eq!(video.content_length, Some(1234));

        let audio = &set.adaptive_formats[1];
        assert_eq!(audio.average_bitrate, Some(128000));
        assert_eq!(audio.url.as_deref(), Some("http://x/a"));
    }

    #[test]
    fn unknown_fields_ignored() {
        let page = format!(
            r#"x id="player-api" y</script>z \"formats\":[],\"adaptiveFormats\":[{}]}}w"#,
            r#"{\"itag\":1,\"mimeType\":\"audio\/webm\",\"averageBitrate\":5,\"audioQuality\":\"AUDIO_QUALITY_MEDIUM\",\"initRange\":{\"start\":\"0\",\"end\":\"9\"}}"#
        );
        let set = FormatSet::from_html(&page).expect("Could not extract format set");
        assert_eq!(set.adaptive_formats.len(), 1);
        assert_eq!(set.adaptive_formats[0].itag, 1);
    }

    #[test]
    fn empty_array_bodies_are_valid() {
        let page = r#"a id="player-api" b</script>c \"formats\":[],\"adaptiveFormats\":[]}d"#;
        let set = FormatSet::from_html(page).expect("Could not extract format set");
        assert!(set.formats.is_empty());
        assert!(set.adaptive_formats.is_empty());
    }

    #[test]
    fn missing_markers_are_named() {
        let err = FormatSet::from_html("<html>nothing here</html>").unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker("player-api")));

        let err = FormatSet::from_html(r#"x id="player-api" no script end"#).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker("</script>")));

        let err =
            FormatSet::from_html(r#"x id="player-api" y</script>z no arrays"#).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingMarker("formats")));

        let page = r#"x id="player-api" y</script>z \"formats\":[],"#;
        let err = FormatSet::from_html(page).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingMarker("adaptiveFormats")
        ));

        let page = r#"x id="player-api" y</script>z \"formats\":[],\"adaptiveFormats\":[ no end"#;
        let err = FormatSet::from_html(page).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingMarker("end of adaptiveFormats")
        ));
    }

    #[test]
    fn parse_failure_names_the_array() {
        let page = r#"x id="player-api" y</script>z \"formats\":[not json],\"adaptiveFormats\":[]}w"#;
        let err = FormatSet::from_html(page).unwrap_err();
        match err {
            ExtractionError::Parse { array, .. } => assert_eq!(array, "formats"),
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn title_extraction() {
        assert_eq!(
            title(&test_page()).as_deref(),
            Some("My Cool Video - Youtube")
        );
        assert_eq!(title("<html><body></body></html>"), None);
    }
}
