//! Named archive compositions for testing extractors
//!
//! Each scenario plants symlink entries that a careless extractor follows
//! out of its target directory. Entries are prepared as [`Entry`] values
//! first and only then written through an [`ArchiveWriter`]; all field
//! encoding happens in the codec.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveOptions, ArchiveWriter, Entry};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Symlink `linkname -> destination`, then the payload written as
    /// `linkname/payload`, both in one archive.
    SymlinkDirOne {
        payload: PathBuf,
        linkname: OsString,
        destination: OsString,
        output: PathBuf,
    },
    /// The same two entries split over two archives, for extractors that
    /// only follow symlinks created by an earlier run.
    SymlinkDirTwo {
        payload: PathBuf,
        linkname: OsString,
        destination: OsString,
        first: PathBuf,
        second: PathBuf,
    },
    /// Symlink `linkname+token -> destination` followed by
    /// `linkname -> linkname+token`. The token (e.g. a newline) hides the
    /// first link from scans that parse extractor output line by line.
    /// `stat_file` only supplies ownership and mtime.
    SymlinkHidden {
        stat_file: PathBuf,
        linkname: OsString,
        destination: OsString,
        output: PathBuf,
        token: OsString,
    },
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::SymlinkDirOne { .. } => "symlink_dir_one",
            Scenario::SymlinkDirTwo { .. } => "symlink_dir_two",
            Scenario::SymlinkHidden { .. } => "symlink_hidden",
        }
    }

    /// Archives this scenario writes, in creation order
    pub fn outputs(&self) -> Vec<PathBuf> {
        match self {
            Scenario::SymlinkDirOne { output, .. } | Scenario::SymlinkHidden { output, .. } => {
                vec![output.clone()]
            }
            Scenario::SymlinkDirTwo { first, second, .. } => vec![first.clone(), second.clone()],
        }
    }

    /// Build every archive of the scenario and return their paths
    ///
    /// All entries are prepared before the first output is created, so a
    /// missing source or an oversized name leaves no file behind.
    pub fn run(&self, options: ArchiveOptions) -> Result<Vec<PathBuf>> {
        let mode = options.field_mode;
        log::debug!("running {} with {:?}", self.name(), options);

        match self {
            Scenario::SymlinkDirOne {
                payload,
                linkname,
                destination,
                output,
            } => {
                let link = Entry::symlink(mode, payload, linkname.as_bytes(), destination.as_bytes())?;
                let file = Entry::file(mode, payload, link_path(linkname, payload))?;
                write_archive(output, options, [link, file])?;
            }
            Scenario::SymlinkDirTwo {
                payload,
                linkname,
                destination,
                first,
                second,
            } => {
                let link = Entry::symlink(mode, payload, linkname.as_bytes(), destination.as_bytes())?;
                let file = Entry::file(mode, payload, link_path(linkname, payload))?;
                write_archive(first, options, [link])?;
                write_archive(second, options, [file])?;
            }
            Scenario::SymlinkHidden {
                stat_file,
                linkname,
                destination,
                output,
                token,
            } => {
                let hidden = hidden_name(linkname, token);
                let inner = Entry::symlink(mode, stat_file, &hidden, destination.as_bytes())?;
                let outer = Entry::symlink(mode, stat_file, linkname.as_bytes(), &hidden)?;
                write_archive(output, options, [inner, outer])?;
            }
        }
        Ok(self.outputs())
    }
}

fn write_archive<const N: usize>(
    output: &Path,
    options: ArchiveOptions,
    entries: [Entry; N],
) -> Result<()> {
    let mut archive = ArchiveWriter::create(output, options)?;
    for entry in entries {
        archive.write_entry(entry)?;
    }
    archive.finish()?;
    Ok(())
}

/// `linkname/payload`: the payload's path as seen through the symlink
pub fn link_path(linkname: &OsStr, payload: &Path) -> Vec<u8> {
    let mut path = linkname.as_bytes().to_vec();
    path.push(b'/');
    path.extend_from_slice(payload.as_os_str().as_bytes());
    path
}

/// `linkname` with `token` appended verbatim
pub fn hidden_name(linkname: &OsStr, token: &OsStr) -> Vec<u8> {
    let mut name = linkname.as_bytes().to_vec();
    name.extend_from_slice(token.as_bytes());
    name
}
