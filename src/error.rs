use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every decode in this crate is a pure function over an immutable input, so none of these
/// errors are retried internally. Structural corruption is always fatal for the structure being
/// parsed, while lookups that simply miss are reported as `None` by the respective APIs and never
/// surface here.
///
/// # Error Categories
///
/// ## Structural Errors
/// - [`Error::Malformed`] - Corrupted container, stream or record layout
/// - [`Error::OutOfBounds`] - Attempted to read beyond a file or stream boundary
/// - [`Error::StreamNotFound`] - A stream index outside the stream directory
/// - [`Error::Empty`] - Empty input provided
///
/// ## Decoder Errors
/// - [`Error::UnknownTypeRecord`] - A type record kind without a decoder
/// - [`Error::UnknownSymbolRecord`] - A symbol record kind without a decoder
/// - [`Error::UnsupportedNumeric`] - A numeric leaf that is not an integer
///
/// ## Symbol Errors
/// - [`Error::NotImplemented`] - A record that cannot be turned into a symbol
/// - [`Error::InvalidArgument`] - A value outside its representable range
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{Error, PdbFile};
/// use std::path::Path;
///
/// match PdbFile::from_file(Path::new("ntdll.pdb")) {
///     Ok(pdb) => println!("{} streams", pdb.streams().len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Corrupt PDB: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// Raised for every structural inconsistency: bad magic, unsupported block sizes,
    /// stream blocks pointing outside the file, hash tables violating their invariants,
    /// unexpected header versions and records whose decoded size does not match their
    /// length prefix. The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// Occurs when a read would cross the end of the underlying file or of a logical
    /// stream view.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A stream index that is not present in the stream directory.
    #[error("Stream {0} does not exist in this PDB")]
    StreamNotFound(u32),

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// A type record whose kind has no decoder.
    ///
    /// The record prefix scan accepts any kind, this error is raised only when the record
    /// itself is decoded.
    #[error("Unknown type record kind 0x{0:04x}")]
    UnknownTypeRecord(u16),

    /// A symbol record whose kind has no decoder.
    ///
    /// Raised only when symbols of that kind are requested.
    #[error("Unknown symbol record kind 0x{0:04x}")]
    UnknownSymbolRecord(u16),

    /// A numeric leaf (real, complex, string, decimal or date) that cannot be represented
    /// as an integer.
    #[error("Unsupported numeric leaf 0x{0:04x}")]
    UnsupportedNumeric(u16),

    /// A type record that cannot be turned into a symbol.
    #[error("Not implemented - {0}")]
    NotImplemented(String),

    /// A decoded value is outside the range the symbol model can represent.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
