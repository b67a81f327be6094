//! Field numbers for the pprof wire format
//!
//! These must match the field numbers in pprof's `profile.proto` exactly;
//! standard consumers (`go tool pprof`, Perfetto, Speedscope) key on them.

// message Profile
pub(crate) const PROFILE_SAMPLE_TYPE: u32 = 1; // repeated ValueType
pub(crate) const PROFILE_SAMPLE: u32 = 2; // repeated Sample
pub(crate) const PROFILE_MAPPING: u32 = 3; // repeated Mapping
pub(crate) const PROFILE_LOCATION: u32 = 4; // repeated Location
pub(crate) const PROFILE_FUNCTION: u32 = 5; // repeated Function
pub(crate) const PROFILE_STRING_TABLE: u32 = 6; // repeated string
pub(crate) const PROFILE_TIME_NANOS: u32 = 9; // int64
pub(crate) const PROFILE_DURATION_NANOS: u32 = 10; // int64
pub(crate) const PROFILE_PERIOD_TYPE: u32 = 11; // ValueType
pub(crate) const PROFILE_PERIOD: u32 = 12; // int64
pub(crate) const PROFILE_COMMENT: u32 = 13; // repeated int64 (string table indices)

// message ValueType
pub(crate) const VALUE_TYPE_TYPE: u32 = 1; // int64 (string table index)
pub(crate) const VALUE_TYPE_UNIT: u32 = 2; // int64 (string table index)

// message Sample
pub(crate) const SAMPLE_LOCATION: u32 = 1; // repeated uint64
pub(crate) const SAMPLE_VALUE: u32 = 2; // repeated int64
pub(crate) const SAMPLE_LABEL: u32 = 3; // repeated Label

// message Label
pub(crate) const LABEL_KEY: u32 = 1; // int64 (string table index)
pub(crate) const LABEL_STR: u32 = 2; // int64 (string table index)
pub(crate) const LABEL_NUM: u32 = 3; // int64

// message Mapping
pub(crate) const MAPPING_ID: u32 = 1; // uint64
pub(crate) const MAPPING_START: u32 = 2; // uint64
pub(crate) const MAPPING_LIMIT: u32 = 3; // uint64
pub(crate) const MAPPING_OFFSET: u32 = 4; // uint64
pub(crate) const MAPPING_FILENAME: u32 = 5; // int64 (string table index)
pub(crate) const MAPPING_BUILD_ID: u32 = 6; // int64 (string table index)
pub(crate) const MAPPING_HAS_FUNCTIONS: u32 = 7; // bool

// message Location
pub(crate) const LOCATION_ID: u32 = 1; // uint64
pub(crate) const LOCATION_MAPPING_ID: u32 = 2; // uint64
pub(crate) const LOCATION_LINE: u32 = 4; // repeated Line

// message Line
pub(crate) const LINE_FUNCTION_ID: u32 = 1; // uint64
pub(crate) const LINE_LINE: u32 = 2; // int64

// message Function
pub(crate) const FUNCTION_ID: u32 = 1; // uint64
pub(crate) const FUNCTION_NAME: u32 = 2; // int64 (string table index)
pub(crate) const FUNCTION_SYSTEM_NAME: u32 = 3; // int64 (string table index)
pub(crate) const FUNCTION_FILENAME: u32 = 4; // int64 (string table index)
