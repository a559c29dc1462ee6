use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::ValidationError;
use crate::index::FieldSchema;

/// Completeness and availability checks for a candidate set of field names.
///
/// Implemented for every [`FieldSchema`].
pub trait CompletenessCheck: FieldSchema {
    /// Check that `candidate` names every mandatory field and nothing the
    /// schema does not offer.
    ///
    /// Succeeds iff `candidate ⊇ mandatory names` and `candidate ⊆ all names`.
    fn check_complete_and_available<I, S>(&self, candidate: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mandatory = self.mandatory_fields();
        let all = self.all_fields();
        let candidate: BTreeSet<String> = candidate
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let missing_required: Vec<String> = mandatory
            .keys()
            .filter(|name| !candidate.contains(*name))
            .cloned()
            .collect();
        let unknown: Vec<String> = candidate
            .iter()
            .filter(|name| !all.contains_key(*name))
            .cloned()
            .collect();

        if missing_required.is_empty() && unknown.is_empty() {
            return Ok(());
        }

        debug!(
            missing = missing_required.len(),
            unknown = unknown.len(),
            "candidate fields rejected"
        );
        Err(ValidationError {
            missing_required,
            unknown,
        })
    }

    /// Validate name-keyed field values and re-key them by field key, ready
    /// to become the `fields` object of a create or edit request.
    fn resolve_fields(&self, values: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        self.check_complete_and_available(values.keys())?;

        let all = self.all_fields();
        let mut resolved = Map::with_capacity(values.len());
        for (name, value) in values {
            if let Some(key) = all.get(name) {
                resolved.insert(key.clone(), value.clone());
            }
        }
        Ok(resolved)
    }
}

impl<T: FieldSchema + ?Sized> CompletenessCheck for T {}
