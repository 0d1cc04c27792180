use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum FfmpegError {
    #[error("I/O error")]
    IoError(#[from] std::io::Error),
    #[error("ffmpeg exited with status {0}")]
    ExitStatus(std::process::ExitStatus),
}

/// Muxes a video file and an audio file into one container, copying both
/// streams without re-encoding. A non-zero exit status is an error; the
/// input files are left alone either way.
pub async fn mux(video: &Path, audio: &Path, output: &Path) -> Result<(), FfmpegError> {
    let mut child = tokio::process::Command::new("ffmpeg");

    child
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(video)
        .arg("-i")
        .arg(audio)
        .arg("-c:v")
        .arg("copy")
        .arg("-c:a")
        .arg("copy")
        .arg(output);

    let status = child.spawn().map_err(FfmpegError::IoError)?.wait().await?;
    if !status.success() {
        return Err(FfmpegError::ExitStatus(status));
    }

    Ok(())
}
