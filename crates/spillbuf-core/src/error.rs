use thiserror::Error;

/// Canonical result for spillbuf.
pub type Result<T> = std::result::Result<T, Error>;

/// No error.
pub const ERR_NONE: i32 = 0;

/// One of the provided pointers is null.
pub const ERR_NULL_PTR: i32 = -1;

/// A length field exceeds its capacity, or a payload does not fit the length word.
pub const ERR_BUFFER_TOO_LARGE: i32 = -2;

/// A capacity is negative, or a spill path does not fit the caller's region.
pub const ERR_BUFFER_TOO_SMALL: i32 = -3;

/// Copy length differs from the expected length.
pub const ERR_COPY_FAILED: i32 = -4;

/// Payload is not well-formed JSON.
pub const ERR_JSON_DECODE_FAILED: i32 = -5;

/// Value could not be encoded as JSON.
pub const ERR_JSON_ENCODE_FAILED: i32 = -6;

/// String, JSON, or spill path bytes are not valid UTF-8.
pub const ERR_INVALID_UTF8: i32 = -7;

/// Spill file could not be read.
pub const ERR_READ_TEMP_FILE_FAILED: i32 = -8;

/// Spill file could not be created or written.
pub const ERR_WRITE_TEMP_FILE_FAILED: i32 = -9;

/// Memory for the requested capacity could not be reserved.
pub const ERR_ALLOC_FAILED: i32 = -10;

/// The callee's own logic failed for domain reasons.
pub const ERR_COMPUTATION_FAILED: i32 = -11;

/// A caller-side write is larger than the buffer capacity.
pub const ERR_CAPACITY_EXCEEDED: i32 = -12;

/// An argument was rejected before crossing the boundary.
pub const ERR_INVALID_ARGUMENT: i32 = -13;

#[derive(Debug, Error)]
pub enum Error {
    #[error("null pointer passed across the boundary")]
    NullPointer,

    #[error("buffer too large: length {length} exceeds limit {limit}")]
    BufferTooLarge { length: i64, limit: i64 },

    #[error("buffer too small: {0}")]
    BufferTooSmall(String),

    #[error("copy failed: expected {expected} bytes, copied {copied}")]
    CopyFailed { expected: usize, copied: usize },

    #[error("JSON decode failed: {0}")]
    JsonDecode(String),

    #[error("JSON encode failed: {0}")]
    JsonEncode(String),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("failed to read spill file: {0}")]
    SpillRead(String),

    #[error("failed to write spill file: {0}")]
    SpillWrite(String),

    #[error("allocation failed for {bytes} bytes: {reason}")]
    AllocFailed { bytes: usize, reason: String },

    #[error("computation failed: {0}")]
    Computation(String),

    #[error("capacity exceeded: {required} bytes required, capacity {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown return code {0}")]
    Unknown(i32),
}

impl Error {
    /// Return code that represents this error at the boundary.
    pub fn code(&self) -> i32 {
        match self {
            Error::NullPointer => ERR_NULL_PTR,
            Error::BufferTooLarge { .. } => ERR_BUFFER_TOO_LARGE,
            Error::BufferTooSmall(_) => ERR_BUFFER_TOO_SMALL,
            Error::CopyFailed { .. } => ERR_COPY_FAILED,
            Error::JsonDecode(_) => ERR_JSON_DECODE_FAILED,
            Error::JsonEncode(_) => ERR_JSON_ENCODE_FAILED,
            Error::InvalidUtf8 => ERR_INVALID_UTF8,
            Error::SpillRead(_) => ERR_READ_TEMP_FILE_FAILED,
            Error::SpillWrite(_) => ERR_WRITE_TEMP_FILE_FAILED,
            Error::AllocFailed { .. } => ERR_ALLOC_FAILED,
            Error::Computation(_) => ERR_COMPUTATION_FAILED,
            Error::CapacityExceeded { .. } => ERR_CAPACITY_EXCEEDED,
            Error::InvalidArgument(_) => ERR_INVALID_ARGUMENT,
            Error::Unknown(code) => *code,
        }
    }

    /// Rebuild a typed error from a negative return code.
    ///
    /// Details that never crossed the boundary (sizes, messages) are lost;
    /// the variant is what callers branch on.
    pub fn from_code(code: i32) -> Self {
        match code {
            ERR_NULL_PTR => Error::NullPointer,
            ERR_BUFFER_TOO_LARGE => Error::BufferTooLarge {
                length: -1,
                limit: -1,
            },
            ERR_BUFFER_TOO_SMALL => Error::BufferTooSmall("reported by callee".into()),
            ERR_COPY_FAILED => Error::CopyFailed {
                expected: 0,
                copied: 0,
            },
            ERR_JSON_DECODE_FAILED => Error::JsonDecode("reported by callee".into()),
            ERR_JSON_ENCODE_FAILED => Error::JsonEncode("reported by callee".into()),
            ERR_INVALID_UTF8 => Error::InvalidUtf8,
            ERR_READ_TEMP_FILE_FAILED => Error::SpillRead("reported by callee".into()),
            ERR_WRITE_TEMP_FILE_FAILED => Error::SpillWrite("reported by callee".into()),
            ERR_ALLOC_FAILED => Error::AllocFailed {
                bytes: 0,
                reason: "reported by callee".into(),
            },
            ERR_COMPUTATION_FAILED => Error::Computation("reported by callee".into()),
            ERR_CAPACITY_EXCEEDED => Error::CapacityExceeded {
                required: 0,
                capacity: 0,
            },
            ERR_INVALID_ARGUMENT => Error::InvalidArgument("reported by callee".into()),
            other => Error::Unknown(other),
        }
    }

    /// True for failures of the marshaling layer itself, as opposed to the
    /// callee rejecting its input.
    pub fn is_marshaling(&self) -> bool {
        !matches!(
            self,
            Error::JsonDecode(_) | Error::Computation(_) | Error::InvalidArgument(_)
        )
    }
}

/// Map a boundary return code to `Ok(code)` for non-negative values.
pub fn check_code(code: i32) -> Result<i32> {
    if code >= 0 {
        Ok(code)
    } else {
        Err(Error::from_code(code))
    }
}

/// Collapse a result into a boundary return code.
pub fn to_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => ERR_NONE,
        Err(e) => e.code(),
    }
}
