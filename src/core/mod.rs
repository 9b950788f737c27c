// Public modules
pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod params;
pub mod pattern;
pub mod renamer;

// Re-export common types for convenience
pub use config::{load_renamer, ConfigFormat, RenameRuleConfig, RenamerConfig};
pub use convert::{to_params_and_prepare, to_slice_string_map};
pub use error::{Error, ErrorCode, Result};
pub use normalize::{normalize_json, normalize_raw, prepare_params, raw_from_json, RawKey, RawValue};
pub use params::{get_nested_param, lookup_equal_fold, Params, StringMap};
pub use pattern::{PathPattern, RenameRule, Segment};
pub use renamer::KeyRenamer;
