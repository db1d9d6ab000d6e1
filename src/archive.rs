//! Archive assembly: metadata sourcing and entry sequencing
//!
//! An [`ArchiveWriter`] appends header+body pairs to a sink in call order.
//! No end-of-archive marker is written unless
//! [`ArchiveOptions::end_of_archive`] is set.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::error::{Result, TarError};
use crate::owner;
use crate::tar::{write_body, EntryType, FieldMode, TarHeader, BLOCK_SIZE};

/// Mode written for symlink entries
const SYMLINK_MODE: u32 = 0o777;

/// Knobs shared by every entry of an archive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub field_mode: FieldMode,
    /// Append two zero blocks after the last entry
    pub end_of_archive: bool,
}

/// Header metadata taken from a file on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Permission bits only, without the file type
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub mtime: u64,
    pub size: u64,
    pub is_file: bool,
    pub uname: Option<String>,
    pub gname: Option<String>,
}

impl EntryMetadata {
    /// Stat `path` and resolve its owner names
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|source| TarError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let uid = meta.uid();
        let gid = meta.gid();
        let uname = owner::user_name(uid);
        if uname.is_none() {
            log::warn!("no user name for uid {uid}, writing an empty uname");
        }
        let gname = owner::group_name(gid);
        if gname.is_none() {
            log::warn!("no group name for gid {gid}, writing an empty gname");
        }
        Ok(Self {
            mode: meta.mode() & 0o7777,
            uid,
            gid,
            mtime: u64::try_from(meta.mtime()).unwrap_or(0),
            size: meta.len(),
            is_file: meta.is_file(),
            uname,
            gname,
        })
    }

    /// Copy ownership and time into `header`
    pub fn apply(&self, header: &mut TarHeader) -> Result<()> {
        header.set_owner(self.uid, self.gid)?;
        header.set_mtime(self.mtime)?;
        header.set_owner_names(self.uname.as_deref(), self.gname.as_deref())
    }
}

/// One finalized header plus, for regular files, the open body source
///
/// Building an entry does every stat, open and field check up front, so a
/// failure leaves the archive untouched.
#[derive(Debug)]
pub struct Entry {
    header: TarHeader,
    body: Option<(File, u64)>,
}

impl Entry {
    pub fn symlink(
        field_mode: FieldMode,
        stat_source: &Path,
        name: impl AsRef<[u8]>,
        target: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let meta = EntryMetadata::from_path(stat_source)?;
        let mut header = TarHeader::with_mode(field_mode);
        header.set_name(name)?;
        header.set_mode(SYMLINK_MODE)?;
        meta.apply(&mut header)?;
        header.set_size(0)?;
        header.set_type(EntryType::Symlink);
        header.set_link_target(target)?;
        header.finalize();
        Ok(Self { header, body: None })
    }

    /// Only regular files are accepted; their size is taken from `stat`.
    pub fn file(field_mode: FieldMode, source: &Path, name: impl AsRef<[u8]>) -> Result<Self> {
        let meta = EntryMetadata::from_path(source)?;
        if !meta.is_file {
            return Err(TarError::SourceUnavailable {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }
        let file = File::open(source).map_err(|e| TarError::SourceUnavailable {
            path: source.to_path_buf(),
            source: e,
        })?;
        let mut header = TarHeader::with_mode(field_mode);
        header.set_name(name)?;
        header.set_mode(meta.mode)?;
        meta.apply(&mut header)?;
        header.set_size(meta.size)?;
        header.set_type(EntryType::RegularFile);
        header.finalize();
        Ok(Self {
            header,
            body: Some((file, meta.size)),
        })
    }

    pub fn header(&self) -> &TarHeader {
        &self.header
    }
}

/// Sequential USTAR writer over an exclusively owned sink
pub struct ArchiveWriter<W: Write> {
    sink: W,
    options: ArchiveOptions,
    entries: usize,
}

impl ArchiveWriter<BufWriter<File>> {
    /// Create (or truncate) the archive file at `path`
    pub fn create(path: &Path, options: ArchiveOptions) -> Result<Self> {
        let file = File::create(path).map_err(|source| TarError::OutputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file), options))
    }
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(sink: W, options: ArchiveOptions) -> Self {
        Self {
            sink,
            options,
            entries: 0,
        }
    }

    pub fn options(&self) -> ArchiveOptions {
        self.options
    }

    /// Number of entries written so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Fresh header using this archive's field mode
    pub fn header(&self) -> TarHeader {
        TarHeader::with_mode(self.options.field_mode)
    }

    /// Write a finalized header that has no body
    pub fn append(&mut self, header: &TarHeader) -> Result<()> {
        log::debug!("header #{}:\n{}", self.entries, header.describe());
        header.serialize(&mut self.sink)?;
        self.entries += 1;
        Ok(())
    }

    /// Write a finalized header followed by `size` bytes of `body`
    pub fn append_with_body<R: Read>(
        &mut self,
        header: &TarHeader,
        body: R,
        size: u64,
    ) -> Result<()> {
        self.append(header)?;
        write_body(body, &mut self.sink, size)?;
        Ok(())
    }

    /// Write a prepared entry, header first, then its body if it has one
    pub fn write_entry(&mut self, entry: Entry) -> Result<()> {
        match entry.body {
            Some((file, size)) => self.append_with_body(&entry.header, file, size),
            None => self.append(&entry.header),
        }
    }

    /// Symlink entry `name -> target`, owned and timed like `stat_source`
    pub fn add_symlink(
        &mut self,
        stat_source: &Path,
        name: impl AsRef<[u8]>,
        target: impl AsRef<[u8]>,
    ) -> Result<()> {
        let entry = Entry::symlink(self.options.field_mode, stat_source, name, target)?;
        self.write_entry(entry)
    }

    /// Regular file entry `name` holding the contents of `source`
    pub fn add_file(&mut self, source: &Path, name: impl AsRef<[u8]>) -> Result<()> {
        let entry = Entry::file(self.options.field_mode, source, name)?;
        self.write_entry(entry)
    }

    /// Write the trailer if configured, flush and hand the sink back
    pub fn finish(mut self) -> Result<W> {
        if self.options.end_of_archive {
            self.sink.write_all(&[0u8; BLOCK_SIZE * 2])?;
        }
        self.sink.flush()?;
        log::info!("archive complete with {} entries", self.entries);
        Ok(self.sink)
    }
}
