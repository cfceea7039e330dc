//! Process exit codes, numbered as in BSD `sysexits.h`.

/// Bad flags, a bad shell line, or a refused removal
pub const USAGE: i32 = 64;

/// A catalog rule was violated or a record was rejected
pub const DATAERR: i32 = 65;

/// An input file does not exist
pub const NOINPUT: i32 = 66;

/// Failure without an I/O cause
pub const SOFTWARE: i32 = 70;

/// Reading or writing a snapshot failed
pub const IOERR: i32 = 74;

/// Settings could not be loaded
pub const CONFIG: i32 = 78;
