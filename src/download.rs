// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Model downloading utilities.
//!
//! This module fetches the MoveNet Thunder ONNX export the pipeline runs
//! inference with. The fetch happens once at startup and is skipped when
//! the file already exists by exact name; nothing on the per-image path
//! touches the network.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PreprocessError, Result};

/// Default pose model file name.
pub const DEFAULT_MODEL: &str = "movenet_singlepose_thunder_4.onnx";

/// URL for downloading the default pose model.
const DEFAULT_MODEL_URL: &str =
    "https://github.com/Kazuhito00/MoveNet-Python-Example/raw/main/onnx/movenet_singlepose_thunder_4.onnx";

/// Connection timeout in seconds.
const CONNECT_TIMEOUT: u64 = 30;

/// Read timeout in seconds.
const READ_TIMEOUT: u64 = 300;

/// Minimum interval between progress updates in seconds.
const MIN_UPDATE_INTERVAL: f64 = 0.1;

/// Format bytes as human-readable string (e.g., "10.4MB").
fn format_bytes(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes >= GB {
        format!("{:.1}GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes / KB)
    } else {
        format!("{bytes:.0}B")
    }
}

/// Download a file from URL to the specified path.
///
/// Streams to a temporary `.part` file, then renames atomically so a
/// partial download can never be mistaken for a cached model.
fn download_file(url: &str, dest: &Path) -> Result<()> {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
        .timeout_recv_body(Some(Duration::from_secs(READ_TIMEOUT)))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let response = agent.get(url).call().map_err(|e| {
        let msg = match &e {
            ureq::Error::Timeout(_) => format!("Connection timed out while downloading {url}"),
            ureq::Error::Io(io_err) => format!("Network error downloading {url}: {io_err}"),
            _ => format!("Failed to download {url}: {e}"),
        };
        PreprocessError::ModelLoadError(msg)
    })?;

    let total_size: u64 = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s: &str| s.parse().ok())
        .unwrap_or(0);

    let temp_path = dest.with_extension("part");
    let _ = fs::remove_file(&temp_path);

    let temp_file = File::create(&temp_path).map_err(|e| {
        PreprocessError::ModelLoadError(format!(
            "Failed to create temp file {}: {e}",
            temp_path.display()
        ))
    })?;
    let mut writer = BufWriter::new(temp_file);

    let mut reader = response.into_body().into_reader();
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 65536];
    let start_time = Instant::now();
    let mut last_update = Instant::now();

    let download_result: Result<()> = (|| {
        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| {
                PreprocessError::ModelLoadError(format!("Failed to read from network: {e}"))
            })?;

            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read]).map_err(|e| {
                PreprocessError::ModelLoadError(format!("Failed to write to temp file: {e}"))
            })?;

            downloaded += bytes_read as u64;

            // Rate-limit progress updates
            let now = Instant::now();
            if now.duration_since(last_update).as_secs_f64() < MIN_UPDATE_INTERVAL {
                continue;
            }
            last_update = now;

            #[allow(clippy::cast_precision_loss)]
            if total_size > 0 {
                eprint!(
                    "\r\x1b[KDownloading {url}: {}/{}",
                    format_bytes(downloaded as f64),
                    format_bytes(total_size as f64)
                );
            } else {
                eprint!("\r\x1b[KDownloading {url}: {}", format_bytes(downloaded as f64));
            }
            std::io::stderr().flush().ok();
        }

        writer.flush().map_err(|e| {
            PreprocessError::ModelLoadError(format!("Failed to flush temp file: {e}"))
        })?;

        Ok(())
    })();

    if let Err(e) = download_result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    #[allow(clippy::cast_precision_loss)]
    let elapsed = start_time.elapsed().as_secs_f64();
    eprintln!(
        "\r\x1b[KDownloaded {url} ({}, {elapsed:.1}s)",
        format_bytes(downloaded as f64)
    );

    fs::rename(&temp_path, dest).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PreprocessError::ModelLoadError(format!(
            "Failed to move downloaded file to {}: {e}",
            dest.display()
        ))
    })?;

    Ok(())
}

/// Ensure the pose model exists in `model_dir`, downloading it if absent.
///
/// Returns the path to the model file. The download is skipped when a file
/// with the exact model name already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the download
/// fails. A missing model is fatal to the whole pipeline, so there is no
/// retry or fallback here.
pub fn ensure_model<P: AsRef<Path>>(model_dir: P) -> Result<PathBuf> {
    let model_dir = model_dir.as_ref();
    fs::create_dir_all(model_dir).map_err(|e| {
        PreprocessError::ModelLoadError(format!(
            "Failed to create model directory {}: {e}",
            model_dir.display()
        ))
    })?;

    let dest = model_dir.join(DEFAULT_MODEL);
    if dest.exists() {
        return Ok(dest);
    }

    download_file(DEFAULT_MODEL_URL, &dest)?;
    Ok(dest)
}
