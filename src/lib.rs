// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # pdbscope
//!
//! A cross-platform reader for Microsoft PDB (Program Database) files, built in pure Rust.
//! `pdbscope` opens the MSF container, decodes the CodeView type and symbol records and
//! resolves them into a navigable graph of types, without requiring Windows or the DIA SDK.
//!
//! ## Features
//!
//! - **Efficient memory access** - Memory-mapped files, streams read through their block map
//!   without copying
//! - **Lazy decoding** - Every stream is parsed on first access, every record on first lookup
//! - **Complete type records** - Classes, unions, enums, pointers, arrays, modifiers,
//!   procedures, field lists, id records and more
//! - **Symbol resolution** - Forward declarations reconciled with their definitions, name
//!   lookups with pointer and qualifier handling
//! - **Memory safe** - Corrupt input is reported through [`Error`], never a panic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdbscope::prelude::*;
//! use std::path::Path;
//!
//! let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
//! println!("{} type records", pdb.tpi()?.record_count());
//!
//! let module = PdbModule::from_pdb(pdb)?;
//! if let Some(list) = module.get_symbol("_LIST_ENTRY")? {
//!     for field in list.fields(&module)? {
//!         println!("+0x{:03x} {} ({} bytes)", field.offset, field.name, field.size);
//!     }
//! }
//! # Ok::<(), pdbscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - Byte sources and the [`BinaryReader`] cursor trait
//! - [`msf`] - Superblock, free page map, stream directory and [`PdbStream`]
//! - [`info`] - PDB info stream and the `/names` string table
//! - [`tpi`] - TPI and IPI streams, [`TypeIndex`] and the built-in types
//! - [`records`] - CodeView type and id record decoders
//! - [`symbols`] - The global symbol record stream
//! - [`dbi`] - Debug information stream: modules, section contributions, debug streams
//! - [`module`] - [`PdbModule`] and [`module::PdbSymbol`], the resolved type graph
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run pdbfile --release
//! ```
#[macro_use]
pub(crate) mod error;

/// Options that control validation and record decoding while opening a file
pub mod config;

/// Debug information stream
///
/// Module descriptors with their source files, section contributions, the section map and
/// the optional debug streams such as the original COFF section headers and FPO records.
pub mod dbi;

/// Byte sources, cursors and little-endian primitives
///
/// # Examples
///
/// ```rust
/// use pdbscope::{BinaryReader, Parser};
///
/// let data = [0x02, 0x80, 0x00, 0x01, b'a', 0x00];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_numeric()?.as_u64(), 0x100);
/// assert_eq!(parser.read_cstring()?, "a");
/// # Ok::<(), pdbscope::Error>(())
/// ```
pub mod file;

/// PDB info stream and string tables
pub mod info;

/// Symbol resolution over the type records
pub mod module;

/// The MSF container format
pub mod msf;

/// The opened PDB file
pub mod pdb;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use pdbscope::prelude::*;
///
/// let pdb = PdbFile::from_file(std::path::Path::new("ntdll.pdb"))?;
/// let module = PdbModule::from_pdb(pdb)?;
/// println!("{} types", module.get_all_types()?.len());
/// # Ok::<(), pdbscope::Error>(())
/// ```
pub mod prelude;

/// CodeView type and id records
pub mod records;

/// Global symbol records
pub mod symbols;

/// Type record streams
pub mod tpi;

/// Hash tables and bit sets of the MSF on-disk format
pub mod utils;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{PdbFile, Result};
///
/// fn load(path: &str) -> Result<PdbFile> {
///     PdbFile::from_file(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `pdbscope` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{Error, PdbFile};
///
/// match PdbFile::from_file(std::path::Path::new("broken.pdb")) {
///     Ok(pdb) => println!("{} streams", pdb.streams().len()),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Main entry points: the container and the resolved symbols
pub use module::PdbModule;
pub use pdb::PdbFile;

/// Loader configuration
pub use config::{PdbConfig, UnknownRecordPolicy};

/// Low-level parsing utilities
pub use file::{
    mapped::MappedBlockReader, numeric::Numeric, parser::Parser, reader::BinaryReader,
};

/// Stream and record types that appear throughout the API
pub use msf::stream::PdbStream;
pub use records::TypeRecord;
pub use tpi::TypeIndex;
