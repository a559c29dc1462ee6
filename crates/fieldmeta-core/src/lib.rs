mod decode;
pub mod error;
pub mod index;
mod lookup;
pub mod models;
pub mod source;
pub mod validate;

pub use error::{FetchError, Result, SchemaError, ValidationError};
pub use index::{FieldNameIndex, FieldSchema};
pub use lookup::find_issue_type_by_name;
pub use models::*;
pub use source::{
    fetch_create_meta, fetch_edit_meta, fetch_issue_type_fields, fetch_issue_types,
    CreateMetaQuery, MetaSource, EXPAND_FIELDS,
};
pub use validate::CompletenessCheck;
