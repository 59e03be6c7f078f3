//! Depot: a persistent blob store for reads and overlaps. Two file pairs
//! (data + index), each index entry an `(offset, length)` pair. The data
//! file handle is held open for the store's lifetime as its lock.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read as IoRead, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{RaocError, Result};
use crate::overlap::Overlap;
use crate::read::Read;

struct BlobIndex {
    entries: Vec<(u64, u64)>,
}

impl BlobIndex {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(BlobIndex { entries: Vec::new() });
        }
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let mut entries = Vec::new();
        for chunk in bytes.chunks(16) {
            if chunk.len() != 16 {
                return Err(RaocError::invalid_input("io::depot", "truncated index file"));
            }
            let offset = u64::from_le_bytes(chunk[0..8].try_into().unwrap());
            let length = u64::from_le_bytes(chunk[8..16].try_into().unwrap());
            entries.push((offset, length));
        }
        Ok(BlobIndex { entries })
    }

    fn store(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for &(offset, length) in &self.entries {
            writer.write_all(&offset.to_le_bytes())?;
            writer.write_all(&length.to_le_bytes())?;
        }
        Ok(())
    }
}

/// A handle onto one `(data, index)` file pair, held open for its lifetime.
pub struct Depot {
    data_path: PathBuf,
    index_path: PathBuf,
    _data_handle: File,
}

impl Depot {
    pub fn open(data_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Result<Self> {
        let data_path = data_path.into();
        let index_path = index_path.into();
        let handle = OpenOptions::new().create(true).read(true).write(true).open(&data_path)?;
        Ok(Depot { data_path, index_path, _data_handle: handle })
    }

    fn append_blobs(&self, blobs: &[Vec<u8>]) -> Result<()> {
        let mut index = BlobIndex::load(&self.index_path)?;
        let mut file = OpenOptions::new().append(true).open(&self.data_path)?;
        let mut offset = file.seek(SeekFrom::End(0))?;
        for blob in blobs {
            file.write_all(blob)?;
            index.entries.push((offset, blob.len() as u64));
            offset += blob.len() as u64;
        }
        index.store(&self.index_path)
    }

    fn read_blobs(&self) -> Result<Vec<Vec<u8>>> {
        let index = BlobIndex::load(&self.index_path)?;
        let mut file = File::open(&self.data_path)?;
        let mut out = Vec::with_capacity(index.entries.len());
        for &(offset, length) in &index.entries {
            let mut buf = vec![0u8; length as usize];
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buf)?;
            out.push(buf);
        }
        Ok(out)
    }

    pub fn store_reads(&self, reads: &[Read]) -> Result<()> {
        let blobs: std::result::Result<Vec<Vec<u8>>, _> = reads.iter().map(bincode::serialize).collect();
        let blobs = blobs.map_err(|e| RaocError::invalid_input("io::depot", e.to_string()))?;
        self.append_blobs(&blobs)
    }

    pub fn load_reads(&self) -> Result<Vec<Read>> {
        self.read_blobs()?
            .iter()
            .map(|b| bincode::deserialize(b).map_err(|e| RaocError::invalid_input("io::depot", e.to_string())))
            .collect()
    }

    pub fn store_overlaps(&self, overlaps: &[Overlap]) -> Result<()> {
        let blobs: std::result::Result<Vec<Vec<u8>>, _> = overlaps.iter().map(bincode::serialize).collect();
        let blobs = blobs.map_err(|e| RaocError::invalid_input("io::depot", e.to_string()))?;
        self.append_blobs(&blobs)
    }

    pub fn load_overlaps(&self) -> Result<Vec<Overlap>> {
        self.read_blobs()?
            .iter()
            .map(|b| bincode::deserialize(b).map_err(|e| RaocError::invalid_input("io::depot", e.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::Read;

    #[test]
    fn round_trips_reads() {
        let dir = tempfile::tempdir().unwrap();
        let depot = Depot::open(dir.path().join("reads.dat"), dir.path().join("reads.idx")).unwrap();
        let reads = vec![Read::new(0, "r1", "ACGT").unwrap(), Read::new(1, "r2", "TTTT").unwrap()];
        depot.store_reads(&reads).unwrap();
        let loaded = depot.load_reads().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].sequence(), "TTTT");
    }
}
