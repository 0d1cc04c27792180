use std::path::{Path, PathBuf};

use crate::{ffmpeg, filename, player_config, select, util};

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error("could not extract formats: {0}")]
    Extraction(#[from] player_config::ExtractionError),
    #[error("could not select streams: {0}")]
    Selection(#[from] select::SelectionError),
    #[error("could not download stream: {0}")]
    Download(#[from] util::DownloadError),
    #[error("could not mux streams: {0}")]
    Mux(#[from] ffmpeg::FfmpegError),
    #[error("I/O error")]
    IoError(#[from] std::io::Error),
    #[error("interrupted")]
    Interrupted,
}

/// Everything the download step needs, computed up front from the page
/// text alone: the chosen streams and the output file stem.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPlan {
    pub selection: select::Selection,
    pub stem: String,
}

impl DownloadPlan {
    pub fn from_html(html: &str) -> Result<Self, WorkerError> {
        let set = player_config::FormatSet::from_html(html)?;
        debug!("formats: {:#?}", set.formats);
        debug!("adaptive formats: {:#?}", set.adaptive_formats);

        let selection = select::select_streams(&set.adaptive_formats)?;

        let title =
            player_config::title(html).unwrap_or_else(|| filename::FALLBACK_TITLE.to_string());
        let stem = filename::stem(&title);

        Ok(Self { selection, stem })
    }
}

fn stream_url<'a>(
    s: &'a player_config::StreamDescriptor,
    kind: &'static str,
) -> Result<&'a str, WorkerError> {
    s.url
        .as_deref()
        .ok_or(WorkerError::Selection(select::SelectionError::MissingUrl {
            kind,
            itag: s.itag,
        }))
}

async fn remove_partials(paths: &[&Path]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
        let _ = tokio::fs::remove_file(format!("{}.tmp", path.to_string_lossy())).await;
    }
}

/// Runs the whole pipeline on an already-fetched page: plan, download both
/// streams, mux into `<stem>.mkv` under `workdir`.
///
/// The two downloads run concurrently and are cancelled on Ctrl-C; partial
/// files are removed on every failed download path. The elementary streams
/// are deleted only after a successful mux, so a failed ffmpeg run leaves
/// them in place for a manual retry.
pub async fn run(
    client: &util::HttpClient,
    html: &str,
    workdir: &Path,
) -> Result<PathBuf, WorkerError> {
    let plan = DownloadPlan::from_html(html)?;
    let (video, audio) = (&plan.selection.video, &plan.selection.audio);

    println!("selected audio={} {}", audio.itag, audio.mime_type);
    println!("         video={} {}", video.itag, video.mime_type);

    let url_video = stream_url(video, "video")?;
    let url_audio = stream_url(audio, "audio")?;
    let path_video = workdir.join(format!("{}.video", plan.stem));
    let path_audio = workdir.join(format!("{}.audio", plan.stem));

    let downloads = async {
        println!("download video to {}:", path_video.display());
        let sz_video = client
            .download_file(url_video, &path_video.to_string_lossy())
            .await?;
        println!("download audio to {}:", path_audio.display());
        let sz_audio = client
            .download_file(url_audio, &path_audio.to_string_lossy())
            .await?;
        Ok::<usize, util::DownloadError>(sz_video + sz_audio)
    };

    let res = tokio::select! {
        res = downloads => res.map_err(WorkerError::Download),
        _ = tokio::signal::ctrl_c() => Err(WorkerError::Interrupted),
    };
    let size = match res {
        Ok(size) => size,
        Err(e) => {
            remove_partials(&[path_video.as_path(), path_audio.as_path()]).await;
            return Err(e);
        }
    };
    info!("downloaded {}", util::format_bytes(size as u64));

    let output = workdir.join(format!("{}.mkv", plan.stem));
    println!("combine audio and video to {}:", output.display());
    ffmpeg::mux(&path_video, &path_audio, &output).await?;

    tokio::fs::remove_file(&path_video).await?;
    tokio::fs::remove_file(&path_audio).await?;

    Ok(output)
}
