use std::sync::LazyLock;

use regex::Regex;

/// Matches the usual YouTube URL shapes and captures the 11-character id:
/// - youtube.com/watch?v=ID (v= anywhere in the query)
/// - youtube.com/v/ID, youtube.com/e/ID, youtube.com/embed/ID
/// - youtube.com/<segment>/<anything>/ID
/// - youtu.be/ID
static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video id pattern is valid")
});

/// Pulls a video id out of arbitrary text. Only the shape is checked.
pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_ID_PATTERN
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn supported_shapes() {
        let urls = [
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/e/dQw4w9WgXcQ",
            "https://www.youtube.com/user/someone/dQw4w9WgXcQ",
            "watch this: https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123 later",
        ];
        for url in urls {
            assert_eq!(extract_video_id(url).as_deref(), Some(ID), "{url}");
        }
    }

    #[test]
    fn ids_with_hyphen_and_underscore() {
        assert_eq!(
            extract_video_id("https://youtu.be/a-b_c-d_e-f").as_deref(),
            Some("a-b_c-d_e-f")
        );
    }

    #[test]
    fn not_found() {
        for input in [
            "",
            "hello world",
            "https://vimeo.com/123456789",
            "https://youtu.be/short",
            "https://example.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(input), None, "{input}");
        }
    }

    #[test]
    fn host_is_case_sensitive() {
        assert_eq!(extract_video_id("https://YOUTU.BE/dQw4w9WgXcQ"), None);
    }
}
