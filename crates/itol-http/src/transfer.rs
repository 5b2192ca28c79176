//! Chunked byte movement with progress and cancellation checks.

use crate::error::TransferError;
use crate::progress::ProgressReporter;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Upper bound on bytes moved between two cancellation checks.
pub const BUFFER_SIZE: usize = 10_000;

/// Upload adapter: every `read` is capped at [`BUFFER_SIZE`], fails once
/// the reporter is cancelled, and advances the reporter's byte count.
pub struct ProgressReader<R> {
    inner: R,
    progress: ProgressReporter,
    sent: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, progress: ProgressReporter) -> Self {
        Self {
            inner,
            progress,
            sent: 0,
        }
    }

    #[must_use]
    pub const fn sent(&self) -> u64 {
        self.sent
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.progress.is_cancelled() {
            return Err(io::Error::other("upload cancelled"));
        }
        let cap = buf.len().min(BUFFER_SIZE);
        let n = self.inner.read(&mut buf[..cap])?;
        self.sent += n as u64;
        self.progress.set_progress(self.sent);
        Ok(n)
    }
}

/// Copy `reader` into `writer` chunk by chunk.
///
/// After each chunk is written the reporter is checked; a cancelled
/// transfer stops before the next read and before progress is advanced.
pub(crate) fn copy_chunks<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    progress: &ProgressReporter,
) -> Result<u64, TransferError> {
    let mut buf = vec![0_u8; BUFFER_SIZE];
    let mut sum = 0_u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        writer.write_all(&buf[..n])?;
        sum += n as u64;
        if progress.is_cancelled() {
            return Err(TransferError::Cancelled);
        }
        progress.set_progress(sum);
    }
    writer.flush()?;
    Ok(sum)
}

/// Read the whole body as text. Invalid UTF-8 is replaced, not rejected.
pub(crate) fn read_text<R: Read>(
    reader: &mut R,
    progress: &ProgressReporter,
) -> Result<String, TransferError> {
    let mut bytes = Vec::new();
    copy_chunks(reader, &mut bytes, progress)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Stream the body into a fresh temporary file and return its path.
///
/// The file outlives the client; removing it is the caller's job.
pub(crate) fn read_file<R: Read>(
    reader: &mut R,
    progress: &ProgressReporter,
    prefix: &str,
) -> Result<PathBuf, TransferError> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile()?;
    copy_chunks(reader, file.as_file_mut(), progress)?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|err| TransferError::Io(err.error))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Cancels the reporter once `limit` chunks have been handed out.
    struct CancelAfter {
        inner: Cursor<Vec<u8>>,
        progress: ProgressReporter,
        chunks: usize,
        limit: usize,
    }

    impl Read for CancelAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            if n > 0 {
                self.chunks += 1;
                if self.chunks == self.limit {
                    self.progress.cancel();
                }
            }
            Ok(n)
        }
    }

    #[test]
    fn copies_everything_and_reports_total() -> Result<(), TransferError> {
        let progress = ProgressReporter::new("download");
        let data = vec![3_u8; 25_000];
        let mut out = Vec::new();
        let n = copy_chunks(&mut Cursor::new(data.clone()), &mut out, &progress)?;
        assert_eq!(n, 25_000);
        assert_eq!(out, data);
        assert_eq!(progress.progress(), 25_000);
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_replaced() -> Result<(), TransferError> {
        let progress = ProgressReporter::new("download");
        let text = read_text(&mut Cursor::new(vec![b'o', b'k', 0xFF]), &progress)?;
        assert_eq!(text, "ok\u{FFFD}");
        Ok(())
    }

    #[test]
    fn read_file_keeps_temp_file() -> Result<(), TransferError> {
        let progress = ProgressReporter::new("download");
        let path = read_file(&mut Cursor::new(vec![1_u8; 12_345]), &progress, "itol-test")?;
        let len = std::fs::metadata(&path)?.len();
        std::fs::remove_file(&path)?;
        assert_eq!(len, 12_345);
        assert!(path.to_string_lossy().ends_with(".tmp"));
        Ok(())
    }

    #[test]
    fn progress_reader_caps_and_stops() {
        let progress = ProgressReporter::new("upload");
        let mut reader = ProgressReader::new(Cursor::new(vec![0_u8; 30_000]), progress.clone());
        let mut buf = vec![0_u8; 64 * 1024];
        assert_eq!(reader.read(&mut buf).ok(), Some(BUFFER_SIZE));
        assert_eq!(progress.progress(), 10_000);

        progress.cancel();
        let err = reader.read(&mut buf).err();
        assert_eq!(err.map(|e| e.kind()), Some(io::ErrorKind::Other));
        assert_eq!(reader.sent(), 10_000);
    }

    proptest! {
        #[test]
        fn cancel_stops_within_one_chunk(len in 1_usize..60_000, limit in 1_usize..8) {
            let progress = ProgressReporter::new("download");
            let mut reader = CancelAfter {
                inner: Cursor::new(vec![9_u8; len]),
                progress: progress.clone(),
                chunks: 0,
                limit,
            };
            let mut out = Vec::new();
            let result = copy_chunks(&mut reader, &mut out, &progress);
            let chunks = len.div_ceil(BUFFER_SIZE);
            if limit <= chunks {
                prop_assert!(matches!(result, Err(TransferError::Cancelled)));
                prop_assert_eq!(out.len(), len.min(limit * BUFFER_SIZE));
                prop_assert_eq!(progress.progress() as usize, (limit - 1) * BUFFER_SIZE);
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(out.len(), len);
            }
        }
    }
}
