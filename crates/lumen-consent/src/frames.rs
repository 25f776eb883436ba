//! Matching consent iframes to browser frames.

use lumen_browser::FrameInfo;
use serde::Deserialize;

/// Attributes of a consent iframe element in the main document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameHint {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

fn same_document(frame_url: &str, src: &str) -> bool {
    let frame_url = strip_fragment(frame_url);
    let src = strip_fragment(src);
    !frame_url.is_empty()
        && !src.is_empty()
        && (frame_url == src || frame_url.starts_with(src) || src.starts_with(frame_url))
}

impl FrameHint {
    /// Whether `frame` is the document loaded by this iframe element.
    pub fn matches(&self, frame: &FrameInfo) -> bool {
        if let Some(name) = frame.name.as_deref().filter(|n| !n.is_empty()) {
            if name == self.name || name == self.id {
                return true;
            }
        }
        frame
            .url
            .as_deref()
            .is_some_and(|url| same_document(url, &self.src))
    }
}

/// Frames hosting consent UI, in frame order, each at most once.
pub fn consent_frames(hints: &[FrameHint], frames: &[FrameInfo]) -> Vec<FrameInfo> {
    frames
        .iter()
        .filter(|frame| hints.iter().any(|hint| hint.matches(frame)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: &str, url: Option<&str>, name: Option<&str>) -> FrameInfo {
        FrameInfo {
            id: id.to_string(),
            url: url.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    fn hint(src: &str, name: &str, id: &str) -> FrameHint {
        FrameHint {
            src: src.to_string(),
            name: name.to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn test_matches_by_src() {
        let hints = [hint("https://cmp.example.net/index.html?consent=1", "", "")];
        let frames = [
            frame("A", Some("https://ads.example.org/slot"), None),
            frame("B", Some("https://cmp.example.net/index.html?consent=1#top"), None),
        ];
        let matched = consent_frames(&hints, &frames);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "B");
    }

    #[test]
    fn test_matches_by_name_or_id() {
        let hints = [hint("", "", "sp_message_iframe_1234")];
        let frames = [
            frame("A", Some("about:blank"), Some("sp_message_iframe_1234")),
            frame("B", Some("about:blank"), Some("other")),
        ];
        let matched = consent_frames(&hints, &frames);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "A");
    }

    #[test]
    fn test_empty_attributes_never_match() {
        let hints = [hint("", "", "")];
        let frames = [frame("A", Some(""), Some("")), frame("B", None, None)];
        assert!(consent_frames(&hints, &frames).is_empty());
    }

    #[test]
    fn test_frame_listed_once() {
        let hints = [
            hint("https://cmp.example.net/", "cmp", ""),
            hint("https://cmp.example.net/", "", ""),
        ];
        let frames = [frame("A", Some("https://cmp.example.net/"), Some("cmp"))];
        assert_eq!(consent_frames(&hints, &frames).len(), 1);
    }
}
