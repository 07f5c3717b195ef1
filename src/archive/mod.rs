// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Directory archives
//!
//! Inputs travel to the server, and outputs come back, as gzip-compressed
//! tar streams. The first entry of a packed archive is always the root
//! marker `./`; the rest follow in file-name order at every level.

mod channel;

pub use channel::{ChannelReader, ChannelWriter, Chunk};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use futures::stream::{self, BoxStream, StreamExt};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, EntryType, Header};
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Chunked archive bytes moving to or from the network
pub type ByteStream = BoxStream<'static, io::Result<Vec<u8>>>;

/// Bytes buffered before a chunk is handed to the channel
const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks in flight between the blocking codec and the network
const CHANNEL_DEPTH: usize = 8;

const ROOT_MARKER: &[u8] = b"./";

/// Write `dir` as a gzip'd tar stream into `writer`, returning the writer
pub fn pack<W: Write>(dir: &Path, writer: W) -> io::Result<W> {
    let mut builder = Builder::new(GzEncoder::new(writer, Compression::default()));
    builder.follow_symlinks(false);

    builder.append(&root_header(dir)?, io::empty())?;

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        if entry.file_type().is_dir() {
            builder.append_dir(relative, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), relative)?;
        }
    }

    builder.into_inner()?.finish()
}

fn root_header(dir: &Path) -> io::Result<Header> {
    let metadata = std::fs::metadata(dir)?;

    let mut header = Header::new_gnu();
    header.set_metadata(&metadata);
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    // set_path normalizes "./" down to "."
    header.as_old_mut().name[..ROOT_MARKER.len()].copy_from_slice(ROOT_MARKER);
    header.set_cksum();

    Ok(header)
}

/// Unpack a gzip'd tar stream from `reader` into `dest`, creating it first
pub fn unpack<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dest)?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);
    archive.unpack(dest)
}

/// Pack `dir` on a blocking thread, yielding the archive as it is produced
pub fn pack_stream(dir: PathBuf) -> ByteStream {
    let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let writer = BufWriter::with_capacity(CHUNK_SIZE, ChannelWriter::new(tx.clone()));
        let packed = pack(&dir, writer).and_then(|mut w| w.flush());

        if let Err(e) = packed {
            tracing::debug!(dir = %dir.display(), error = %e, "packing stopped");
            let _ = tx.blocking_send(Err(e));
        }
    });

    receiver_stream(rx)
}

/// Unpack an archive stream into `dest` without buffering it whole
pub async fn unpack_stream(mut bytes: ByteStream, dest: &Path) -> io::Result<()> {
    let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
    let dest = dest.to_path_buf();

    let unpacker = tokio::task::spawn_blocking(move || unpack(ChannelReader::new(rx), &dest));

    while let Some(chunk) = bytes.next().await {
        // unpacker gave up; its own error is the one worth reporting
        if tx.send(chunk).await.is_err() {
            break;
        }
    }
    drop(tx);

    unpacker.await.map_err(io::Error::other)?
}

fn receiver_stream(rx: mpsc::Receiver<Chunk>) -> ByteStream {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|chunk| (chunk, rx)) }).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("task.yml"), "platform: linux\n").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("main.sh"), "echo hi\n").unwrap();
        std::fs::write(dir.path().join("README"), "readme").unwrap();
        dir
    }

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut archive = Archive::new(GzDecoder::new(archive));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                let name = String::from_utf8_lossy(&e.path_bytes()).into_owned();
                if name == "./" {
                    name
                } else {
                    name.trim_end_matches('/').to_string()
                }
            })
            .collect()
    }

    #[test]
    fn test_root_marker_first_then_sorted_entries() {
        let dir = fixture();
        let packed = pack(dir.path(), Vec::new()).unwrap();

        assert_eq!(
            entry_names(&packed),
            vec!["./", "README", "src", "src/main.sh", "task.yml"]
        );
    }

    #[test]
    fn test_unpack_creates_destination() {
        let dir = fixture();
        let packed = pack(dir.path(), Vec::new()).unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("nested").join("output");
        unpack(&packed[..], &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("src").join("main.sh")).unwrap(),
            "echo hi\n"
        );
        assert_eq!(std::fs::read(dest.join("README")).unwrap(), b"readme");
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let out = TempDir::new().unwrap();
        assert!(unpack(&b"definitely not gzip"[..], out.path()).is_err());
    }

    #[tokio::test]
    async fn test_streams_carry_directory_contents() {
        let dir = fixture();
        let out = TempDir::new().unwrap();

        unpack_stream(pack_stream(dir.path().to_path_buf()), out.path())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(out.path().join("task.yml")).unwrap(),
            "platform: linux\n"
        );
    }

    #[tokio::test]
    async fn test_unpack_stream_reports_transport_error() {
        let dir = fixture();
        let packed = pack(dir.path(), Vec::new()).unwrap();
        let half = packed[..packed.len() / 2].to_vec();

        let broken: ByteStream = stream::iter(vec![
            Ok(half),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "dropped")),
        ])
        .boxed();

        let out = TempDir::new().unwrap();
        assert!(unpack_stream(broken, out.path()).await.is_err());
    }
}
