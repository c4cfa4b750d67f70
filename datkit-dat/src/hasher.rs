use std::io::Read;
use std::path::Path;
use std::sync::mpsc::sync_channel;

use sha1::Digest;

use datkit_core::{HashKind, HashRecord};

use crate::error::DatError;

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Running state for every digest a scanned file gets.
struct Digests {
    crc: crc32fast::Hasher,
    md5: md5::Context,
    sha1: sha1::Sha1,
    sha256: sha2::Sha256,
    sha384: sha2::Sha384,
    sha512: sha2::Sha512,
    size: u64,
}

impl Digests {
    fn new() -> Self {
        Self {
            crc: crc32fast::Hasher::new(),
            md5: md5::Context::new(),
            sha1: sha1::Sha1::new(),
            sha256: sha2::Sha256::new(),
            sha384: sha2::Sha384::new(),
            sha512: sha2::Sha512::new(),
            size: 0,
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        self.crc.update(chunk);
        self.md5.consume(chunk);
        self.sha1.update(chunk);
        self.sha256.update(chunk);
        self.sha384.update(chunk);
        self.sha512.update(chunk);
        self.size += chunk.len() as u64;
    }

    fn finish(self) -> Result<HashRecord, DatError> {
        let mut record = HashRecord::new().with_size(self.size);
        record.set(HashKind::Crc, &self.crc.finalize().to_be_bytes())?;
        record.set(HashKind::Md5, &self.md5.compute().0)?;
        record.set(HashKind::Sha1, &self.sha1.finalize())?;
        record.set(HashKind::Sha256, &self.sha256.finalize())?;
        record.set(HashKind::Sha384, &self.sha384.finalize())?;
        record.set(HashKind::Sha512, &self.sha512.finalize())?;
        Ok(record)
    }
}

/// Compute size, CRC32, MD5, and the SHA family of a stream in one pass.
///
/// Reading runs one chunk ahead of hashing on a scoped thread: while one
/// buffer is being hashed the next is being filled. At most two buffers
/// exist at a time; spent buffers are sent back for reuse.
pub fn hash_reader<R: Read + Send>(reader: R) -> Result<HashRecord, DatError> {
    hash_reader_with_progress(reader, &|_| {})
}

/// Like [`hash_reader`], reporting the running byte count after each chunk.
pub fn hash_reader_with_progress<R: Read + Send>(
    mut reader: R,
    progress: &dyn Fn(u64),
) -> Result<HashRecord, DatError> {
    let (full_tx, full_rx) = sync_channel::<std::io::Result<(Vec<u8>, usize)>>(1);
    let (empty_tx, empty_rx) = sync_channel::<Vec<u8>>(2);
    // Two buffers in rotation
    for _ in 0..2 {
        let _ = empty_tx.send(vec![0u8; CHUNK_SIZE]);
    }

    std::thread::scope(|scope| -> Result<HashRecord, DatError> {
        scope.spawn(move || {
            while let Ok(mut buf) = empty_rx.recv() {
                let read = loop {
                    match reader.read(&mut buf) {
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        other => break other,
                    }
                };
                match read {
                    Ok(0) => break,
                    Ok(n) => {
                        if full_tx.send(Ok((buf, n))).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = full_tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        let mut digests = Digests::new();
        // The reader thread drops `full_tx` at EOF, ending this loop.
        for message in full_rx {
            let (buf, n) = message?;
            digests.update(&buf[..n]);
            progress(digests.size);
            // A closed return channel only means the reader already finished
            let _ = empty_tx.send(buf);
        }
        digests.finish()
    })
}

/// Hash a file on disk.
pub fn hash_file(path: &Path) -> Result<HashRecord, DatError> {
    let file = std::fs::File::open(path)?;
    hash_reader(file)
}
