//! Derives the output file stem from a video title.

/// Used when the watch page has no `<title>` tag.
pub const FALLBACK_TITLE: &str = "unknown video";

/// Normalizes a title into a filesystem-safe stem: drops the " - Youtube"
/// suffix, trims, lowercases, spaces become underscores and newlines are
/// removed outright.
pub fn stem(title: &str) -> String {
    title
        .replace(" - Youtube", "")
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('\n', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_site_suffix() {
        assert_eq!(stem("My Cool Video - Youtube"), "my_cool_video");
    }

    #[test]
    fn newlines_removed_not_replaced() {
        assert_eq!(stem("Foo\nBar"), "foobar");
    }

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(stem("  Some TITLE  "), "some_title");
    }

    #[test]
    fn fallback_title_stem() {
        assert_eq!(stem(FALLBACK_TITLE), "unknown_video");
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        // " - YouTube" (capital T) is not the marker the page emits here
        assert_eq!(stem("Clip - YouTube"), "clip_-_youtube");
    }
}
