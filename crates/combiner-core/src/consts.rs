/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Rows computed per parallel band before progress is reported.
pub const PARALLEL_BAND_ROWS: usize = 64;

/// Progress is reported whenever the running pixel count is a multiple of this.
pub const PROGRESS_PIXEL_INTERVAL: usize = 1000;

/// Number of samples per pixel (alpha, red, green, blue).
pub const CHANNEL_COUNT: usize = 4;

/// JPEG quality used for composite output (0-100 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Operation name carried by the final progress event of a run.
pub const COMPLETE_OPERATION_NAME: &str = "complete";

/// Largest payload a single JPEG APP segment can carry (length field minus itself).
pub const MAX_APP_SEGMENT_PAYLOAD: usize = 65_533;
