//! Resolution of ephemeris sources into files on disk.
//!
//! A NAIF kernel is looked up in this order:
//!
//! 1. an explicit user path (`"naif:/data/de432s.bsp"`), which must exist,
//! 2. the cache directory of the [`SkyGeomEnv`],
//! 3. the NAIF generic kernels server, only when the `jpl-download` feature is enabled.
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::{env_state::SkyGeomEnv, skygeom_errors::SkyGeomError};

use super::EphemFileSource;

/// Download a large file from a URL
/// Uses reqwest to download the file in chunks
/// and saves it to the specified path using tokio's async file I/O
/// and stream processing.
///
/// The bytes land in `<path>.part`, renamed to `path` once complete. The partial file is
/// removed when the transfer fails.
///
/// Arguments
/// ---------
/// * `url`: the URL of the file to download
/// * `path`: the path to save the downloaded file
///
/// Return
/// ------
/// * An error if the download fails
/// * Ok(()) if the download is successful
#[cfg(feature = "jpl-download")]
async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), SkyGeomError> {
    use log::{info, warn};

    let partial = path.with_extension("part");
    info!("Downloading {url}...");

    match stream_to_file(url, &partial, path).await {
        Ok(()) => {
            info!("Downloaded {url} to {path}");
            Ok(())
        }
        Err(err) => {
            warn!("download of {url} failed: {err}");
            if partial.exists() {
                tokio::fs::remove_file(&partial).await?;
            }
            Err(err)
        }
    }
}

#[cfg(feature = "jpl-download")]
async fn stream_to_file(
    url: &str,
    partial: &Utf8Path,
    path: &Utf8Path,
) -> Result<(), SkyGeomError> {
    use tokio::{fs::File, io::AsyncWriteExt};
    use tokio_stream::StreamExt;

    let mut stream = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes_stream();

    let mut file = File::create(partial).await?;
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    tokio::fs::rename(partial, path).await?;
    Ok(())
}

/// Blocking download of `url` into `local_file`, creating its parent directory.
///
/// Callable from plain threads and from code already running on a tokio runtime: in the latter
/// case the transfer is driven by a private runtime on a scoped thread, blocking the caller until
/// it completes.
#[cfg(feature = "jpl-download")]
fn download_naif_file(url: &str, local_file: &Utf8Path) -> Result<(), SkyGeomError> {
    if let Some(parent) = local_file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| SkyGeomError::UnableToCreateBaseDir(format!("{parent}: {err}")))?;
    }

    let run = || -> Result<(), SkyGeomError> {
        tokio::runtime::Runtime::new()?.block_on(download_big_file(url, local_file))
    };
    match tokio::runtime::Handle::try_current() {
        // block_on panics on a thread that already drives a runtime
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(run)
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        }),
        Err(_) => run(),
    }
}

#[cfg(not(feature = "jpl-download"))]
fn download_naif_file(_url: &str, local_file: &Utf8Path) -> Result<(), SkyGeomError> {
    Err(SkyGeomError::JPLFileNotFound(format!(
        "{local_file} (enable the `jpl-download` feature to fetch it from NAIF)"
    )))
}

/// Get the path of the kernel described by a NAIF file source.
///
/// Arguments
/// ---------
/// * `file_source`: the ephemeris source, only the NAIF variants resolve to a file
/// * `env`: environment holding the cache directory
///
/// Return
/// ------
/// * The path to the ephemeris file
/// * [`SkyGeomError::JPLFileNotFound`] if the file cannot be found or downloaded
/// * [`SkyGeomError::InvalidEphemFileSource`] for the builtin source, which has no file
pub fn get_ephemeris_file(
    file_source: &EphemFileSource,
    env: &SkyGeomEnv,
) -> Result<Utf8PathBuf, SkyGeomError> {
    match file_source {
        EphemFileSource::Builtin => Err(SkyGeomError::InvalidEphemFileSource(
            "the builtin ephemeris is not backed by a file".into(),
        )),
        EphemFileSource::NaifPath(path) => {
            if path.exists() {
                Ok(path.clone())
            } else {
                Err(SkyGeomError::JPLFileNotFound(path.to_string()))
            }
        }
        EphemFileSource::Naif(version) => {
            let local_file = env.cache_dir.join(version.get_filename());
            if local_file.exists() {
                debug!("using cached NAIF kernel {local_file}");
                return Ok(local_file);
            }
            download_naif_file(&version.url(), &local_file)?;
            Ok(local_file)
        }
    }
}
