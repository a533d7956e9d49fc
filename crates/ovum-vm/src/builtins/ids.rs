//! The reserved virtual-method id spellings the VM dispatches on.
//!
//! These exact strings are part of the language ABI: the parser encodes
//! call targets with them and the built-in registration installs them, so
//! any respelling silently breaks dispatch.

/// Virtual id of every destructor.
pub const DESTRUCTOR: &str = "_destructor_<M>";
/// Virtual id of the comparable equality method.
pub const EQUALS: &str = "_Equals_<C>_IComparable";
/// Virtual id of the comparable ordering method.
pub const IS_LESS: &str = "_IsLess_<C>_IComparable";
/// Virtual id of the string-conversion method.
pub const TO_STRING: &str = "_ToString_<C>";
/// Virtual id of the hash method (also the `PureFunction` fingerprint).
pub const GET_HASH: &str = "_GetHash_<C>";
/// Virtual id of the length method (String and every array class).
pub const LENGTH: &str = "_Length_<C>";
/// Virtual id of `String`'s byte-view method.
pub const TO_UTF8_BYTES: &str = "_ToUtf8Bytes_<C>";

/// Virtual id of `File::Open`.
pub const FILE_OPEN: &str = "_Open_<M>_String_String";
/// Virtual id of `File::Close`.
pub const FILE_CLOSE: &str = "_Close_<M>";
/// Virtual id of `File::IsOpen`.
pub const FILE_IS_OPEN: &str = "_IsOpen_<C>";
/// Virtual id of `File::Read`.
pub const FILE_READ: &str = "_Read_<M>_Int";
/// Virtual id of `File::Write`.
pub const FILE_WRITE: &str = "_Write_<M>_ByteArray";
/// Virtual id of `File::ReadLine`.
pub const FILE_READ_LINE: &str = "_ReadLine_<M>";
/// Virtual id of `File::WriteLine`.
pub const FILE_WRITE_LINE: &str = "_WriteLine_<M>_String";
/// Virtual id of `File::Seek`.
pub const FILE_SEEK: &str = "_Seek_<M>_Int";
/// Virtual id of `File::Tell`.
pub const FILE_TELL: &str = "_Tell_<C>";
/// Virtual id of `File::Eof`.
pub const FILE_EOF: &str = "_Eof_<C>";
