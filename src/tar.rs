//! USTAR header codec and body writer
//!
//! # Usage
//!
//! ## Writing a regular file entry
//!
//! ```rust
//! use tarcraft::tar::{write_body, EntryType, TarHeader};
//!
//! # fn main() -> Result<(), tarcraft::TarError> {
//! let body = b"Hello, World";
//! let mut header = TarHeader::new();
//! header.set_name("hello.txt")?;
//! header.set_mode(0o644)?;
//! header.set_size(body.len() as u64)?;
//! header.set_type(EntryType::RegularFile);
//! header.finalize();
//!
//! let mut archive = Vec::new();
//! header.serialize(&mut archive)?;
//! write_body(&body[..], &mut archive, body.len() as u64)?;
//! assert_eq!(archive.len(), 1024);
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspecting a header
//!
//! ```rust
//! use tarcraft::tar::{EntryType, TarHeader};
//!
//! # fn main() -> Result<(), tarcraft::TarError> {
//! let mut header = TarHeader::new();
//! header.set_name("link")?;
//! header.set_type(EntryType::Symlink);
//! header.set_link_target("../../etc")?;
//! header.finalize();
//!
//! assert!(header.verify_checksum());
//! println!("{}", header.describe());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io::{self, Read, Write};
use std::ops::Range;

use chrono::DateTime;

use crate::error::{Result, TarError};

/// Size of a header record and of every body block
pub const BLOCK_SIZE: usize = 512;

const MAGIC: &[u8; 6] = b"ustar\0";
const VERSION: &[u8; 2] = b"  ";

/// Location of one fixed-width field inside the header record
#[derive(Clone, Copy, Debug)]
struct Field {
    name: &'static str,
    offset: usize,
    len: usize,
}

impl Field {
    const fn new(name: &'static str, offset: usize, len: usize) -> Self {
        Self { name, offset, len }
    }

    fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

const NAME: Field = Field::new("name", 0, 100);
const MODE: Field = Field::new("mode", 100, 8);
const UID: Field = Field::new("uid", 108, 8);
const GID: Field = Field::new("gid", 116, 8);
const SIZE: Field = Field::new("size", 124, 12);
const MTIME: Field = Field::new("mtime", 136, 12);
const CHECKSUM: Field = Field::new("checksum", 148, 8);
const TYPEFLAG: usize = 156;
const LINKNAME: Field = Field::new("linkname", 157, 100);
const MAGIC_FIELD: Field = Field::new("magic", 257, 6);
const VERSION_FIELD: Field = Field::new("version", 263, 2);
const UNAME: Field = Field::new("uname", 265, 32);
const GNAME: Field = Field::new("gname", 297, 32);
const DEVMAJOR: Field = Field::new("devmajor", 329, 8);
const DEVMINOR: Field = Field::new("devminor", 337, 8);

/// How setters react to values that do not fit their field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldMode {
    /// Reject the value with [`TarError::FieldOverflow`]
    #[default]
    Strict,
    /// Truncate silently, like legacy tar tooling: strings keep their first
    /// `width - 1` bytes and octal numbers their leading digits
    Lenient,
}

/// Kind of entry described by a header, mapped to the single typeflag byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryType {
    RegularFile,
    HardLink,
    Symlink,
    CharDevice,
    BlockDevice,
    Directory,
    Fifo,
    Contiguous,
    Unknown(u8),
}

impl EntryType {
    /// Decodes a typeflag byte. Both `'0'` and NUL are regular files.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 | b'0' => EntryType::RegularFile,
            b'1' => EntryType::HardLink,
            b'2' => EntryType::Symlink,
            b'3' => EntryType::CharDevice,
            b'4' => EntryType::BlockDevice,
            b'5' => EntryType::Directory,
            b'6' => EntryType::Fifo,
            b'7' => EntryType::Contiguous,
            other => EntryType::Unknown(other),
        }
    }

    /// The byte written to the typeflag field
    pub fn as_byte(self) -> u8 {
        match self {
            EntryType::RegularFile => b'0',
            EntryType::HardLink => b'1',
            EntryType::Symlink => b'2',
            EntryType::CharDevice => b'3',
            EntryType::BlockDevice => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Contiguous => b'7',
            EntryType::Unknown(byte) => byte,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryType::RegularFile => "regular file",
            EntryType::HardLink => "hard link",
            EntryType::Symlink => "symbolic link",
            EntryType::CharDevice => "character special file",
            EntryType::BlockDevice => "block special file",
            EntryType::Directory => "directory",
            EntryType::Fifo => "FIFO special file",
            EntryType::Contiguous => "contiguous file",
            EntryType::Unknown(_) => "invalid",
        }
    }
}

/// Label for a raw typeflag byte. NUL is the pre-POSIX spelling of a regular
/// file and keeps its own label.
fn typeflag_label(byte: u8) -> &'static str {
    if byte == 0 {
        "regular file (old)"
    } else {
        EntryType::from_byte(byte).label()
    }
}

/// One 512-byte USTAR header record
///
/// Fields are encoded into the record as they are set. The checksum is only
/// valid after [`TarHeader::finalize`]; any later setter call invalidates it
/// and [`TarHeader::serialize`] refuses to write the record until it is
/// finalized again.
#[derive(Clone, PartialEq, Eq)]
pub struct TarHeader {
    bytes: [u8; BLOCK_SIZE],
    field_mode: FieldMode,
    finalized: bool,
}

impl Default for TarHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TarHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TarHeader")
            .field("name", &self.name().escape_ascii().to_string())
            .field("entry_type", &self.entry_type())
            .field("field_mode", &self.field_mode)
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl TarHeader {
    /// Create an empty header in strict mode
    pub fn new() -> Self {
        Self::with_mode(FieldMode::default())
    }

    /// Create an empty header: zero-filled, checksum field set to spaces,
    /// magic `"ustar\0"` and version `"  "`.
    pub fn with_mode(field_mode: FieldMode) -> Self {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[CHECKSUM.range()].fill(b' ');
        bytes[MAGIC_FIELD.range()].copy_from_slice(MAGIC);
        bytes[VERSION_FIELD.range()].copy_from_slice(VERSION);
        Self {
            bytes,
            field_mode,
            finalized: false,
        }
    }

    /// Wrap an existing record. It counts as finalized when its stored
    /// checksum is valid.
    pub fn from_bytes(bytes: &[u8; BLOCK_SIZE]) -> Self {
        let mut header = Self {
            bytes: *bytes,
            field_mode: FieldMode::default(),
            finalized: false,
        };
        header.finalized = header.verify_checksum();
        header
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }

    pub fn field_mode(&self) -> FieldMode {
        self.field_mode
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // ------------------------------------------------------------
    // setters
    // ------------------------------------------------------------
    pub fn set_name(&mut self, name: impl AsRef<[u8]>) -> Result<()> {
        self.write_str(NAME, name.as_ref())
    }

    /// Permission bits, written as 7 octal digits
    pub fn set_mode(&mut self, mode: u32) -> Result<()> {
        self.write_octal(MODE, mode.into())
    }

    pub fn set_owner(&mut self, uid: u32, gid: u32) -> Result<()> {
        self.write_octal(UID, uid.into())?;
        self.write_octal(GID, gid.into())
    }

    /// Body length in bytes; 0 for anything but regular files
    pub fn set_size(&mut self, size: u64) -> Result<()> {
        self.write_octal(SIZE, size)
    }

    /// Modification time in seconds since the epoch
    pub fn set_mtime(&mut self, mtime: u64) -> Result<()> {
        self.write_octal(MTIME, mtime)
    }

    pub fn set_type(&mut self, entry_type: EntryType) {
        self.bytes[TYPEFLAG] = entry_type.as_byte();
        self.finalized = false;
    }

    /// Target of a hard link or symlink entry
    pub fn set_link_target(&mut self, target: impl AsRef<[u8]>) -> Result<()> {
        self.write_str(LINKNAME, target.as_ref())
    }

    /// Owner names as resolved by the caller. An unresolved name is written
    /// as an empty string.
    pub fn set_owner_names(&mut self, user: Option<&str>, group: Option<&str>) -> Result<()> {
        self.write_str(UNAME, user.unwrap_or_default().as_bytes())?;
        self.write_str(GNAME, group.unwrap_or_default().as_bytes())
    }

    pub fn set_device_numbers(&mut self, major: u32, minor: u32) -> Result<()> {
        self.write_octal(DEVMAJOR, major.into())?;
        self.write_octal(DEVMINOR, minor.into())
    }

    /// Compute the checksum over the current record and store it as six
    /// octal digits, NUL and space. Must be the last mutation before
    /// [`TarHeader::serialize`].
    pub fn finalize(&mut self) {
        let sum = calc_checksum(&self.bytes);
        // 512 * 0xff still fits in six octal digits
        let digits = format!("{sum:06o}");
        let field = &mut self.bytes[CHECKSUM.range()];
        field[..6].copy_from_slice(digits.as_bytes());
        field[6] = 0;
        field[7] = b' ';
        self.finalized = true;
    }

    /// Write the record verbatim to `sink`
    pub fn serialize<W: Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        if !self.finalized {
            return Err(TarError::NotFinalized);
        }
        sink.write_all(&self.bytes)?;
        Ok(())
    }

    /// Labeled dump of every field, one per line
    pub fn describe(&self) -> String {
        Dump(self).to_string()
    }

    // ------------------------------------------------------------
    // getters
    // ------------------------------------------------------------
    pub fn name(&self) -> &[u8] {
        self.read_str(NAME)
    }

    pub fn link_target(&self) -> &[u8] {
        self.read_str(LINKNAME)
    }

    pub fn user_name(&self) -> &[u8] {
        self.read_str(UNAME)
    }

    pub fn group_name(&self) -> &[u8] {
        self.read_str(GNAME)
    }

    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.bytes[TYPEFLAG])
    }

    pub fn mode(&self) -> Option<u32> {
        self.read_octal(MODE).and_then(|v| u32::try_from(v).ok())
    }

    pub fn size(&self) -> Option<u64> {
        self.read_octal(SIZE)
    }

    pub fn mtime(&self) -> Option<u64> {
        self.read_octal(MTIME)
    }

    /// Checksum currently stored in the record, if any
    pub fn stored_checksum(&self) -> Option<u32> {
        self.read_octal(CHECKSUM).and_then(|v| u32::try_from(v).ok())
    }

    /// True if the stored checksum matches the record contents
    pub fn verify_checksum(&self) -> bool {
        self.stored_checksum() == Some(calc_checksum(&self.bytes))
    }

    // ------------------------------------------------------------
    // field encoding
    // ------------------------------------------------------------
    fn fit<'a>(&self, field: Field, value: &'a [u8]) -> Result<&'a [u8]> {
        // the last byte of every field stays NUL
        let capacity = field.len - 1;
        if value.len() <= capacity {
            return Ok(value);
        }
        match self.field_mode {
            FieldMode::Strict => Err(TarError::FieldOverflow {
                field: field.name,
                len: value.len(),
                capacity,
            }),
            FieldMode::Lenient => Ok(&value[..capacity]),
        }
    }

    fn put(&mut self, field: Field, value: &[u8]) {
        let dst = &mut self.bytes[field.range()];
        dst.fill(0);
        dst[..value.len()].copy_from_slice(value);
        self.finalized = false;
    }

    fn write_str(&mut self, field: Field, value: &[u8]) -> Result<()> {
        let value = self.fit(field, value)?;
        self.put(field, value);
        Ok(())
    }

    fn write_octal(&mut self, field: Field, value: u64) -> Result<()> {
        let digits = field.len - 1;
        let text = format!("{value:0digits$o}");
        let text = self.fit(field, text.as_bytes())?;
        self.put(field, text);
        Ok(())
    }

    fn read_str(&self, field: Field) -> &[u8] {
        let raw = &self.bytes[field.range()];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        &raw[..end]
    }

    fn read_octal(&self, field: Field) -> Option<u64> {
        let raw = &self.bytes[field.range()];
        let text = std::str::from_utf8(raw).ok()?;
        let text = text.trim_matches(|c: char| c == '\0' || c == ' ');
        if text.is_empty() {
            return None;
        }
        u64::from_str_radix(text, 8).ok()
    }
}

struct Dump<'a>(&'a TarHeader);

impl Dump<'_> {
    fn text(&self, field: Field) -> String {
        self.0.read_str(field).escape_ascii().to_string()
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.0;
        writeln!(f, "Filename:        '{}'", self.text(NAME))?;
        writeln!(f, "Filemode:        '{}'", self.text(MODE))?;
        writeln!(f, "User ID:         '{}'", self.text(UID))?;
        writeln!(f, "Group ID:        '{}'", self.text(GID))?;
        writeln!(f, "File size:       '{}'", self.text(SIZE))?;
        write!(f, "Modify time:     '{}'", self.text(MTIME))?;
        let stamp = header
            .mtime()
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        if let Some(stamp) = stamp {
            write!(f, " ({})", stamp.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        writeln!(f)?;
        writeln!(f, "Header checksum: '{}'", self.text(CHECKSUM))?;
        writeln!(f, "Link flag:       '{}'", typeflag_label(header.bytes[TYPEFLAG]))?;
        writeln!(f, "Link name:       '{}'", self.text(LINKNAME))?;
        writeln!(f, "Magic:           '{}'", self.text(MAGIC_FIELD))?;
        writeln!(f, "Version:         '{}'", self.text(VERSION_FIELD))?;
        writeln!(f, "User name:       '{}'", self.text(UNAME))?;
        writeln!(f, "Group name:      '{}'", self.text(GNAME))?;
        writeln!(f, "Major device ID: '{}'", self.text(DEVMAJOR))?;
        write!(f, "Minor device ID: '{}'", self.text(DEVMINOR))
    }
}

/// Calc checksum of the header bytes, counting the checksum field as spaces
pub fn calc_checksum(data: &[u8; BLOCK_SIZE]) -> u32 {
    let mut sum: u32 = 0;
    for (i, &b) in data.iter().enumerate() {
        if CHECKSUM.range().contains(&i) {
            sum += b' ' as u32;
        } else {
            sum += b as u32;
        }
    }
    sum
}

/// Zero bytes needed to round `size` up to the next block boundary
pub fn padding_for(size: u64) -> u64 {
    let block = BLOCK_SIZE as u64;
    (block - size % block) % block
}

/// Lazy sequence of body blocks drawn from a reader
///
/// Yields `declared` bytes of `source` in 512-byte blocks, the last one zero
/// padded. A source that ends early yields [`TarError::ShortBody`] once and
/// then stops.
pub struct BodyBlocks<R> {
    source: R,
    declared: u64,
    read: u64,
    failed: bool,
}

impl<R: Read> BodyBlocks<R> {
    pub fn new(source: R, declared: u64) -> Self {
        Self {
            source,
            declared,
            read: 0,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for BodyBlocks<R> {
    type Item = Result<[u8; BLOCK_SIZE]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.read >= self.declared {
            return None;
        }
        let want = (self.declared - self.read).min(BLOCK_SIZE as u64) as usize;
        let mut block = [0u8; BLOCK_SIZE];
        let mut filled = 0;
        while filled < want {
            match self.source.read(&mut block[filled..want]) {
                Ok(0) => {
                    self.failed = true;
                    return Some(Err(TarError::ShortBody {
                        declared: self.declared,
                        read: self.read + filled as u64,
                    }));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }
        self.read += want as u64;
        Some(Ok(block))
    }
}

/// Stream `declared_size` bytes of `source` into `sink`, padded to the block
/// boundary. Returns the number of bytes written.
pub fn write_body<R: Read, W: Write + ?Sized>(
    source: R,
    sink: &mut W,
    declared_size: u64,
) -> Result<u64> {
    let mut written = 0;
    for block in BodyBlocks::new(source, declared_size) {
        sink.write_all(&block?)?;
        written += BLOCK_SIZE as u64;
    }
    log::debug!(
        "body: {} bytes, {} bytes padding",
        declared_size,
        padding_for(declared_size)
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(header: &TarHeader, field: Field) -> &[u8] {
        &header.as_bytes()[field.range()]
    }

    #[test]
    fn new_header_layout_test() {
        let header = TarHeader::new();
        let bytes = header.as_bytes();
        assert_eq!(bytes.len(), BLOCK_SIZE);
        assert_eq!(&bytes[148..156], b"        ");
        assert_eq!(&bytes[257..263], b"ustar\0");
        assert_eq!(&bytes[263..265], b"  ");
        assert!(bytes[..148].iter().all(|&b| b == 0));
        assert!(bytes[345..].iter().all(|&b| b == 0));
        assert!(!header.is_finalized());
        assert_eq!(header.stored_checksum(), None);
    }

    #[test]
    fn checksum_of_empty_header_test() {
        // 8 spaces + "ustar" + 2 spaces = 256 + 559 + 64
        let mut header = TarHeader::new();
        header.finalize();
        assert_eq!(calc_checksum(header.as_bytes()), 879);
        assert_eq!(field(&header, CHECKSUM), b"001557\0 ");
        assert_eq!(header.stored_checksum(), Some(0o1557));
    }

    #[test]
    fn checksum_matches_blanked_byte_sum_test() {
        let mut header = TarHeader::new();
        header.set_name("some/dir/file.bin").unwrap();
        header.set_mode(0o755).unwrap();
        header.set_owner(1000, 100).unwrap();
        header.set_size(4096).unwrap();
        header.set_mtime(1_700_000_000).unwrap();
        header.set_type(EntryType::RegularFile);
        header.set_owner_names(Some("alice"), Some("users")).unwrap();
        header.finalize();

        let mut blanked = *header.as_bytes();
        blanked[148..156].fill(b' ');
        let sum: u32 = blanked.iter().map(|&b| b as u32).sum();
        assert_eq!(header.stored_checksum(), Some(sum));
        assert!(header.verify_checksum());
    }

    #[test]
    fn octal_fields_are_zero_padded_test() {
        let mut header = TarHeader::new();
        header.set_mode(0).unwrap();
        header.set_owner(0o644, 1).unwrap();
        header.set_size(12).unwrap();
        header.set_mtime(0).unwrap();
        header.set_device_numbers(8, 1).unwrap();
        assert_eq!(field(&header, MODE), b"0000000\0");
        assert_eq!(field(&header, UID), b"0000644\0");
        assert_eq!(field(&header, GID), b"0000001\0");
        assert_eq!(field(&header, SIZE), b"00000000014\0");
        assert_eq!(field(&header, MTIME), b"00000000000\0");
        assert_eq!(field(&header, DEVMAJOR), b"0000010\0");
        assert_eq!(field(&header, DEVMINOR), b"0000001\0");
        assert_eq!(header.size(), Some(12));
        assert_eq!(header.mode(), Some(0));
    }

    #[test]
    fn entry_type_labels_test() {
        let cases = [
            (EntryType::RegularFile, b'0', "regular file"),
            (EntryType::HardLink, b'1', "hard link"),
            (EntryType::Symlink, b'2', "symbolic link"),
            (EntryType::CharDevice, b'3', "character special file"),
            (EntryType::BlockDevice, b'4', "block special file"),
            (EntryType::Directory, b'5', "directory"),
            (EntryType::Fifo, b'6', "FIFO special file"),
            (EntryType::Contiguous, b'7', "contiguous file"),
            (EntryType::Unknown(b'x'), b'x', "invalid"),
        ];
        for (kind, byte, label) in cases {
            let mut header = TarHeader::new();
            header.set_type(kind);
            assert_eq!(header.as_bytes()[TYPEFLAG], byte);
            assert_eq!(header.entry_type(), EntryType::from_byte(byte));
            let expected = format!("Link flag:       '{label}'");
            assert!(header.describe().contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn nul_typeflag_is_old_regular_file_test() {
        let header = TarHeader::new();
        assert_eq!(header.entry_type(), EntryType::RegularFile);
        assert!(header.describe().contains("'regular file (old)'"));
    }

    #[test]
    fn serialize_is_idempotent_test() {
        let mut header = TarHeader::new();
        header.set_name("twice.txt").unwrap();
        header.finalize();
        let mut first = Vec::new();
        let mut second = Vec::new();
        header.serialize(&mut first).unwrap();
        header.serialize(&mut second).unwrap();
        assert_eq!(first.len(), BLOCK_SIZE);
        assert_eq!(first, second);
    }

    #[test]
    fn serialize_requires_finalize_test() {
        let mut header = TarHeader::new();
        let mut sink = Vec::new();
        assert!(matches!(header.serialize(&mut sink), Err(TarError::NotFinalized)));

        header.finalize();
        header.set_name("changed").unwrap();
        assert!(matches!(header.serialize(&mut sink), Err(TarError::NotFinalized)));
        assert!(sink.is_empty());

        header.finalize();
        header.serialize(&mut sink).unwrap();
        assert_eq!(sink.len(), BLOCK_SIZE);
    }

    #[test]
    fn oversized_name_is_rejected_in_strict_mode_test() {
        let mut header = TarHeader::new();
        header.set_mode(0o644).unwrap();
        let err = header.set_name("a".repeat(200)).unwrap_err();
        match err {
            TarError::FieldOverflow { field, len, capacity } => {
                assert_eq!(field, "name");
                assert_eq!(len, 200);
                assert_eq!(capacity, 99);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(header.name().is_empty());
        assert_eq!(field(&header, MODE), b"0000644\0");
    }

    #[test]
    fn oversized_name_is_truncated_in_lenient_mode_test() {
        let mut header = TarHeader::with_mode(FieldMode::Lenient);
        header.set_mode(0o644).unwrap();
        header.set_name("a".repeat(200)).unwrap();
        assert_eq!(header.name(), "a".repeat(99).as_bytes());
        assert_eq!(header.as_bytes()[99], 0);
        assert_eq!(field(&header, MODE), b"0000644\0");
    }

    #[test]
    fn name_of_exactly_capacity_fits_test() {
        let mut header = TarHeader::new();
        header.set_name("b".repeat(99)).unwrap();
        assert_eq!(header.name().len(), 99);
        assert!(header.set_name("b".repeat(100)).is_err());
    }

    #[test]
    fn octal_overflow_test() {
        let mut strict = TarHeader::new();
        assert!(matches!(
            strict.set_mode(0o10000000),
            Err(TarError::FieldOverflow { field: "mode", len: 8, capacity: 7 })
        ));

        let mut lenient = TarHeader::with_mode(FieldMode::Lenient);
        lenient.set_mode(0o12345670).unwrap();
        assert_eq!(field(&lenient, MODE), b"1234567\0");
    }

    #[test]
    fn missing_owner_names_are_empty_test() {
        let mut header = TarHeader::new();
        header.set_owner_names(Some("root"), Some("wheel")).unwrap();
        header.set_owner_names(None, None).unwrap();
        assert!(header.user_name().is_empty());
        assert!(field(&header, UNAME).iter().all(|&b| b == 0));
        assert!(field(&header, GNAME).iter().all(|&b| b == 0));
    }

    #[test]
    fn control_characters_are_kept_verbatim_test() {
        let mut header = TarHeader::new();
        header.set_name("link\nhidden").unwrap();
        header.set_type(EntryType::Symlink);
        header.finalize();
        assert_eq!(header.name(), b"link\nhidden");
        let dump = header.describe();
        assert!(dump.contains("Filename:        'link\\nhidden'"));
        assert!(dump.contains("'symbolic link'"));
    }

    #[test]
    fn describe_renders_mtime_test() {
        let mut header = TarHeader::new();
        header.set_mtime(86_400).unwrap();
        header.finalize();
        let dump = header.describe();
        assert!(dump.contains("Modify time:     '00000250600' (1970-01-02 00:00:00 UTC)"));
        assert!(dump.contains("Magic:           'ustar'"));
        assert!(dump.contains("Header checksum: '"));
    }

    #[test]
    fn from_bytes_keeps_record_test() {
        let mut header = TarHeader::new();
        header.set_name("copy.txt").unwrap();
        header.set_size(3).unwrap();
        header.finalize();
        let copy = TarHeader::from_bytes(header.as_bytes());
        assert!(copy.is_finalized());
        assert_eq!(copy.name(), b"copy.txt");
        assert_eq!(copy.size(), Some(3));

        let mut corrupt = *header.as_bytes();
        corrupt[0] = b'X';
        assert!(!TarHeader::from_bytes(&corrupt).is_finalized());
    }

    #[test]
    fn body_is_padded_to_block_boundary_test() {
        for size in [0u64, 1, 12, 511, 512, 513, 1024, 1500] {
            let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8 + 1).collect();
            let mut sink = Vec::new();
            let written = write_body(&data[..], &mut sink, size).unwrap();

            let expected = size.div_ceil(BLOCK_SIZE as u64) * BLOCK_SIZE as u64;
            assert_eq!(written, expected, "size {size}");
            assert_eq!(sink.len() as u64, expected, "size {size}");
            assert_eq!(&sink[..size as usize], &data[..]);
            assert!(sink[size as usize..].iter().all(|&b| b == 0));
            assert_eq!(sink.len() as u64 - size, padding_for(size));
        }
    }

    #[test]
    fn body_reads_only_declared_bytes_test() {
        let data = [7u8; 600];
        let mut sink = Vec::new();
        write_body(&data[..], &mut sink, 10).unwrap();
        assert_eq!(sink.len(), BLOCK_SIZE);
        assert!(sink[..10].iter().all(|&b| b == 7));
        assert!(sink[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn short_source_is_an_error_test() {
        let data = [1u8; 10];
        let mut sink = Vec::new();
        let err = write_body(&data[..], &mut sink, 100).unwrap_err();
        assert!(matches!(err, TarError::ShortBody { declared: 100, read: 10 }));

        let mut blocks = BodyBlocks::new(&[0u8; 600][..], 1000);
        assert!(blocks.next().unwrap().is_ok());
        assert!(blocks.next().unwrap().is_err());
        assert!(blocks.next().is_none());
    }

    #[test]
    fn padding_formula_test() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 511);
        assert_eq!(padding_for(512), 0);
        assert_eq!(padding_for(700), 324);
    }
}
