//! Parameters for mesh reading.

/// Default limit on the length of the DMT header string, in bytes.
pub const DEFAULT_DMT_HEADER_LIMIT: usize = 256;

/// How an `.stl` file is classified as ASCII or binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlDetection {
    /// ASCII if the first line starts with `solid`, binary otherwise.
    #[default]
    FirstLine,
    /// As [`FirstLine`](Self::FirstLine), but a `solid` header that holds NUL
    /// bytes within its first 80 bytes is treated as binary. Some exporters
    /// write `solid` into binary headers.
    Heuristic,
}

/// Parameters for reading mesh files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadParams {
    /// ASCII/binary STL classification. Default: [`StlDetection::FirstLine`]
    pub stl_detection: StlDetection,

    /// Maximum number of bytes consumed for the DMT header string when no
    /// NUL terminator is found. Default: 256
    pub dmt_header_limit: usize,
}

impl Default for ReadParams {
    fn default() -> Self {
        Self {
            stl_detection: StlDetection::FirstLine,
            dmt_header_limit: DEFAULT_DMT_HEADER_LIMIT,
        }
    }
}

impl ReadParams {
    /// Set the STL classification strategy.
    #[must_use]
    pub const fn with_stl_detection(mut self, detection: StlDetection) -> Self {
        self.stl_detection = detection;
        self
    }

    /// Set the DMT header length limit.
    #[must_use]
    pub const fn with_dmt_header_limit(mut self, limit: usize) -> Self {
        self.dmt_header_limit = limit;
        self
    }
}
