//! Writing proxied downloads to disk for the CLI.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::download::proxy::DownloadStreamResult;
use crate::error::Result;
use crate::fs::download_target;
use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Stream a download into `directory` without overwriting existing files.
///
/// A partially written file is removed when the stream fails.
pub async fn save_to_directory(
    download: DownloadStreamResult,
    directory: &Path,
    show_progress: bool,
) -> Result<PathBuf> {
    let output_path = download_target(directory, &download.filename)?;

    match write_stream(download, &output_path, show_progress).await {
        Ok(bytes) => {
            tracing::info!("Saved {} ({} bytes)", output_path.display(), bytes);
            Ok(output_path)
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&output_path).await {
                tracing::warn!("Failed to remove partial file {}: {}", output_path.display(), cleanup);
            }
            Err(e)
        }
    }
}

async fn write_stream(
    download: DownloadStreamResult,
    output_path: &Path,
    show_progress: bool,
) -> Result<u64> {
    let content_length = download.content_length;
    // Unknown sizes always get a counter.
    let progress = (show_progress && content_length.map_or(true, |l| l > PROGRESS_THRESHOLD))
        .then(|| create_download_bar(&download.filename, content_length));

    let mut file = File::create(output_path).await?;
    let mut stream = download.stream;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(ref pb) = progress {
            pb.set_position(downloaded);
        }
    }

    file.flush().await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(downloaded)
}
