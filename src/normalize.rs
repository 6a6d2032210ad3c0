//! Raw cell to `Observation` normalization

pub mod derived;
pub mod field_coercer;
pub mod observation;
pub mod timestamp_resolver;

pub use derived::dew_point_c;
pub use field_coercer::{coerce_numeric, coerce_text};
pub use observation::{CategoricalField, NumericField, Observation};
pub use timestamp_resolver::{resolve_date, resolve_time, resolve_timestamp};
