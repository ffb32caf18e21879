//! External references in question text
//!
//! Statements may carry one spoken-audio link (`.mp3`/`.mp4`) and one
//! video link (Vimeo or YouTube). Extra links of either kind are dropped
//! with a warning.

use crate::model::{Media, Video, VideoProvider};
use crate::text::escape_html;

/// Whether a link points at a speech recording
pub fn is_speech_link(link: &str) -> bool {
    let lower = link.to_lowercase();
    lower.ends_with(".mp3") || lower.ends_with(".mp4")
}

/// Video code and provider for a Vimeo or YouTube link
pub fn video_code(link: &str) -> Option<Video> {
    if let Some((_, rest)) = link.split_once("vimeo.com/") {
        let parts: Vec<&str> = rest.split('/').collect();
        let code = match parts.as_slice() {
            [id, hash, ..] => {
                let hash = hash.split("?share").next().unwrap_or_default();
                format!("{}?h={}", id, hash)
            }
            _ => rest.to_string(),
        };
        return Some(Video {
            code,
            provider: VideoProvider::Vimeo,
        });
    }

    let id = if let Some((_, rest)) = link.split_once("watch?v=") {
        rest
    } else if let Some((_, rest)) = link.split_once("youtu.be/") {
        rest
    } else {
        return None;
    };
    let code = id.split(&['?', '&'][..]).next().unwrap_or_default();
    Some(Video {
        code: code.to_string(),
        provider: VideoProvider::YouTube,
    })
}

/// Sort statement links into media slots
///
/// Returns the warnings for dropped links.
pub fn classify_links(links: &[String], media: &mut Media) -> Vec<String> {
    let mut warnings = Vec::new();
    for link in links {
        if is_speech_link(link) {
            if media.speech_url.is_some() {
                warnings.push(format!("Chỉ được 1 link TTS: {}", link));
            } else {
                media.speech_url = Some(link.clone());
            }
        } else if let Some(video) = video_code(link) {
            if media.video.is_some() {
                warnings.push(format!("Chỉ được 1 link Video: {}", link));
            } else {
                media.video = Some(video);
            }
        } else {
            log::debug!("Ignoring link {}", link);
        }
    }
    warnings
}

/// `<audio>` player markup for a recording
pub fn audio_player(url: &str) -> String {
    format!(
        r#"<audio controls=""><source src="{}" type="audio/mpeg">Your browser does not support the audio element.</audio>"#,
        escape_html(url)
    )
}
