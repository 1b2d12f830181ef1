//! Registry persistence.
//!
//! On-disk format (all integers little-endian):
//! ```text
//! [4 bytes: magic "EVPR"]
//! [2 bytes: format version (u16)]
//! [8 bytes: record count (u64)]
//! then, per record, in slot order:
//!   [4 bytes: entry length (u32)]
//!   [4 bytes: CRC32 of payload (u32)]
//!   [N bytes: payload (bincode-serialized Record)]
//! ```
//!
//! Slot positions are not stored. Loading re-inserts every record through
//! the normal insert path, so the probe layout is rebuilt from scratch.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use evplan_types::Record;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::registry::Registry;

/// File magic.
pub const MAGIC: [u8; 4] = *b"EVPR";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Magic + version + record count.
const FILE_HEADER_SIZE: usize = 14;

/// Entry length + CRC.
const ENTRY_HEADER_SIZE: usize = 8;

/// Largest entry accepted on load or produced on save (64 MiB).
pub const MAX_ENTRY_LEN: u32 = 64 * 1024 * 1024;

/// Smallest bincode-encoded record: two u64 length prefixes and a one-byte key.
const MIN_RECORD_LEN: usize = 17;

/// Reject a record whose encoded form would not fit in one entry.
pub(crate) fn check_record_len(record: &Record) -> Result<()> {
    let size = bincode::serialized_size(record)
        .map_err(|e| RegistryError::Serialization(format!("record {:?}: {e}", record.key)))?;
    let max = u64::from(MAX_ENTRY_LEN);
    if size > max {
        return Err(RegistryError::RecordTooLarge {
            key: record.key.clone(),
            size,
            max,
        });
    }
    Ok(())
}

impl Registry {
    /// Open a registry file with the given configuration.
    pub fn open(path: impl AsRef<Path>, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config)?;
        registry.load(path)?;
        Ok(registry)
    }

    /// Write every record to `path`. Returns the number of records written.
    ///
    /// Records go to a temporary file in the destination directory, which is
    /// synced and then renamed over `path`; a failed save leaves any previous
    /// file at `path` intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.save_with(path.as_ref(), |writer| self.write_records(writer))
    }

    fn save_with<F>(&self, path: &Path, write_body: F) -> Result<usize>
    where
        F: FnOnce(&mut dyn Write) -> std::result::Result<(), SaveError>,
    {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| RegistryError::persistence(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RegistryError::persistence(dir, e))?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            write_body(&mut writer).map_err(|e| into_save_error(path, e))?;
            writer
                .flush()
                .map_err(|e| RegistryError::persistence(path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| RegistryError::persistence(path, e))?;
        tmp.persist(path)
            .map_err(|e| RegistryError::persistence(path, e.error))?;

        debug!(path = %path.display(), records = self.len(), "registry saved");
        Ok(self.len())
    }

    /// Replace the registry's contents with the records stored at `path`.
    /// Returns the number of records loaded.
    ///
    /// The file is read into a fresh table with this registry's config and
    /// hasher; the current contents are only replaced once the whole file
    /// has been read and validated.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let fresh = self.read_file(path)?;
        let count = fresh.len();
        *self = fresh;

        debug!(
            path = %path.display(),
            records = count,
            capacity = self.capacity(),
            "registry loaded"
        );
        Ok(count)
    }

    fn write_records(&self, writer: &mut dyn Write) -> std::result::Result<(), SaveError> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&(self.len() as u64).to_le_bytes())?;

        for record in self.iter() {
            let payload = bincode::serialize(record)
                .map_err(|e| SaveError::Encode(format!("record {:?}: {e}", record.key)))?;
            let length = u32::try_from(payload.len())
                .ok()
                .filter(|len| *len <= MAX_ENTRY_LEN)
                .ok_or_else(|| {
                    SaveError::Encode(format!(
                        "record {:?} is {} bytes, maximum is {MAX_ENTRY_LEN}",
                        record.key,
                        payload.len()
                    ))
                })?;

            writer.write_all(&length.to_le_bytes())?;
            writer.write_all(&crc32fast::hash(&payload).to_le_bytes())?;
            writer.write_all(&payload)?;
        }
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Registry> {
        let file = File::open(path).map_err(|e| RegistryError::persistence(path, e))?;
        let file_len = file
            .metadata()
            .map_err(|e| RegistryError::persistence(path, e))?
            .len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; FILE_HEADER_SIZE];
        read_exact(&mut reader, &mut header, path, "file header")?;

        if header[0..4] != MAGIC {
            return Err(RegistryError::format(path, "bad magic"));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != FORMAT_VERSION {
            return Err(RegistryError::format(
                path,
                format!("unsupported format version {version}"),
            ));
        }
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&header[6..14]);
        let count = u64::from_le_bytes(count_bytes);

        // Every entry needs its header and a minimal record, which bounds a
        // sane count before any slots are allocated for it.
        let min_entry = (ENTRY_HEADER_SIZE + MIN_RECORD_LEN) as u64;
        let max_count = file_len.saturating_sub(FILE_HEADER_SIZE as u64) / min_entry;
        let expected = usize::try_from(count)
            .ok()
            .filter(|_| count <= max_count)
            .ok_or_else(|| {
                RegistryError::format(
                    path,
                    format!("record count {count} exceeds what a {file_len}-byte file can hold"),
                )
            })?;

        let mut fresh = self.fresh_sibling(expected)?;
        for index in 0..count {
            let record = read_entry(&mut reader, path, index)?;
            let key = record.key.clone();
            match fresh.insert(record.key, record.payload) {
                Ok(None) => {}
                Ok(Some(_)) => {
                    return Err(RegistryError::format(
                        path,
                        format!("duplicate key {key:?} in entry {index}"),
                    ))
                }
                Err(e @ RegistryError::InvalidKey { .. }) => {
                    return Err(RegistryError::format(path, format!("entry {index}: {e}")))
                }
                Err(e) => return Err(e),
            }
        }

        let mut trailing = [0u8; 1];
        match reader.read(&mut trailing) {
            Ok(0) => Ok(fresh),
            Ok(_) => Err(RegistryError::format(
                path,
                "trailing bytes after last record",
            )),
            Err(e) => Err(RegistryError::persistence(path, e)),
        }
    }
}

fn read_entry<R: Read>(reader: &mut R, path: &Path, index: u64) -> Result<Record> {
    let mut header = [0u8; ENTRY_HEADER_SIZE];
    read_exact(reader, &mut header, path, "entry header")?;

    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if length == 0 || length > MAX_ENTRY_LEN {
        return Err(RegistryError::format(
            path,
            format!("invalid length {length} for entry {index}"),
        ));
    }

    let mut payload = vec![0u8; length as usize];
    read_exact(reader, &mut payload, path, "entry payload")?;

    let actual_crc = crc32fast::hash(&payload);
    if actual_crc != expected_crc {
        return Err(RegistryError::format(
            path,
            format!(
                "CRC mismatch in entry {index}: expected {expected_crc:#010x}, got {actual_crc:#010x}"
            ),
        ));
    }

    bincode::deserialize::<Record>(&payload).map_err(|e| {
        RegistryError::format(path, format!("cannot decode entry {index}: {e}"))
    })
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], path: &Path, what: &str) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(RegistryError::format(path, format!("truncated {what}")))
        }
        Err(e) => Err(RegistryError::persistence(path, e)),
    }
}

enum SaveError {
    Io(io::Error),
    Encode(String),
}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

fn into_save_error(path: &Path, e: SaveError) -> RegistryError {
    match e {
        SaveError::Io(e) => RegistryError::persistence(path, e),
        SaveError::Encode(reason) => RegistryError::Serialization(reason),
    }
}
