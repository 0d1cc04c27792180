use crate::player_config::StreamDescriptor;

/// The chosen best audio and best video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub video: StreamDescriptor,
    pub audio: StreamDescriptor,
}

#[derive(thiserror::Error, Debug)]
pub enum SelectionError {
    #[error("no {0} streams")]
    Empty(&'static str),
    #[error("{kind} stream itag {itag} has no {field}")]
    MissingField {
        kind: &'static str,
        itag: i64,
        field: &'static str,
    },
    #[error("selected {kind} stream itag {itag} has no url")]
    MissingUrl { kind: &'static str, itag: i64 },
}

/// First-max selection: on a tied key the earliest descriptor wins.
/// (`Iterator::max_by_key` keeps the last maximum, which is not what we
/// want here.)
fn best_by<'a>(
    streams: &[&'a StreamDescriptor],
    kind: &'static str,
    field: &'static str,
    key: impl Fn(&StreamDescriptor) -> Option<i64>,
) -> Result<&'a StreamDescriptor, SelectionError> {
    let mut best: Option<(&'a StreamDescriptor, i64)> = None;

    for &s in streams {
        let k = key(s).ok_or(SelectionError::MissingField {
            kind,
            itag: s.itag,
            field,
        })?;
        match best {
            Some((_, max)) if k <= max => (),
            _ => best = Some((s, k)),
        }
    }

    best.map(|(s, _)| s).ok_or(SelectionError::Empty(kind))
}

/// Partitions the adaptive formats by mime-type substring and picks the
/// video with the greatest height and the audio with the greatest average
/// bitrate.
///
/// The two substring tests are independent on purpose: the page's own
/// tagging is loose, so a descriptor may be classified as both or neither.
pub fn select_streams(adaptive: &[StreamDescriptor]) -> Result<Selection, SelectionError> {
    let video: Vec<_> = adaptive
        .iter()
        .filter(|s| s.mime_type.contains("video"))
        .collect();
    let audio: Vec<_> = adaptive
        .iter()
        .filter(|s| s.mime_type.contains("audio"))
        .collect();

    let video = best_by(&video, "video", "height", |s| s.height)?;
    let audio = best_by(&audio, "audio", "averageBitrate", |s| s.average_bitrate)?;

    for (kind, s) in [("video", video), ("audio", audio)] {
        if s.url.as_deref().unwrap_or("").is_empty() {
            return Err(SelectionError::MissingUrl { kind, itag: s.itag });
        }
    }

    Ok(Selection {
        video: video.clone(),
        audio: audio.clone(),
    })
}
