pub mod error;
pub mod params;
pub mod query;
pub mod settings;
pub mod status;

pub use error::QueryError;
pub use params::{ParamKind, ParamValue, QueryParams, QuerySchema};
pub use query::{build_query_string, validate};
pub use settings::{Settings, SettingsError};
pub use status::{ResponseOutcome, StatusClass, UnknownStatus, classify};
