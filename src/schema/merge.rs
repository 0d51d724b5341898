//! Merging of schema entries
//!
//! Every rule here is a join: merging is commutative per field for
//! records that do not conflict, which is what lets partial maps built
//! from separate partitions be combined with [`SchemaGenerator::merge_schema_maps`].

use super::generator::{json_full_path, SchemaGenerator};
use super::lattice::convert_type;
use super::types::{FieldInfo, FieldKind, SchemaEntry, SchemaMap, Status, ValueType};
use crate::error::{Error, Result};
use crate::types::Mode;
use std::collections::HashSet;
use tracing::info;

impl SchemaGenerator {
    /// Merge `new` into `old`
    ///
    /// Returns the merged entry, or `None` when the field has to be dropped
    /// because of a type or mode conflict (the conflict is logged). An
    /// `Err` means an invariant was broken and the run must stop.
    pub fn merge_schema_entry(
        &mut self,
        old: Option<SchemaEntry>,
        mut new: SchemaEntry,
        base_path: &str,
    ) -> Result<Option<SchemaEntry>> {
        let Some(mut old) = old else {
            return Ok(Some(new));
        };

        // Once a record misses the field it stays unfilled
        if !old.filled || !new.filled {
            old.filled = false;
            new.filled = false;
        }

        let full_old_name = json_full_path(base_path, &old.info.name);
        let full_new_name = json_full_path(base_path, &new.info.name);

        if old.info.name != new.info.name {
            if old.info.name.to_lowercase() != new.info.name.to_lowercase() {
                return Err(Error::internal(format!(
                    "Unexpected difference in name: old_name ({full_old_name}) != new_name ({full_new_name})"
                )));
            }
            // First-seen casing wins
            new.info.name.clone_from(&old.info.name);
        }

        match (old.status, new.status) {
            // new soft does not clobber old hard
            (Status::Hard, Status::Soft) => {
                return Ok(self.merge_mode(&old, &new, base_path).map(|mode| {
                    old.info.mode = mode;
                    old
                }));
            }
            // new hard clobbers old soft
            (Status::Soft, Status::Hard) => {
                return Ok(self.merge_mode(&old, &new, base_path).map(|mode| {
                    new.info.mode = mode;
                    new
                }));
            }
            (Status::Soft, Status::Soft) | (Status::Hard, Status::Hard) => {}
        }

        if old.info.kind.is_record() && new.info.kind.is_record() {
            return self.merge_record_entry(old, new, base_path, &full_old_name);
        }

        let old_desc = old.describe(&full_old_name);
        let new_desc = new.describe(&full_new_name);

        let Some(mode) = self.merge_mode(&old, &new, base_path) else {
            return Ok(None);
        };
        new.info.mode = mode;

        let old_type = old.info.kind.value_type();
        let new_type = new.info.kind.value_type();
        if old_type != new_type {
            match convert_type(old_type, new_type) {
                Some(ValueType::Scalar(joined)) => new.info.kind = FieldKind::Scalar(joined),
                _ => {
                    self.log_error(format!(
                        "Ignoring field with mismatched type: old={old_desc}; new={new_desc}"
                    ));
                    return Ok(None);
                }
            }
        }
        Ok(Some(new))
    }

    /// RECORD x RECORD: reconcile the modes, then merge the sub-fields of
    /// `new` into `old`
    fn merge_record_entry(
        &mut self,
        mut old: SchemaEntry,
        new: SchemaEntry,
        base_path: &str,
        full_old_name: &str,
    ) -> Result<Option<SchemaEntry>> {
        match (old.info.mode, new.info.mode) {
            (Mode::Nullable, Mode::Repeated) => {
                old.info.mode = Mode::Repeated;
                info!(field = full_old_name, "Widening NULLABLE RECORD to REPEATED");
                self.log_error(format!(
                    "Converting schema for \"{full_old_name}\" from NULLABLE RECORD into REPEATED RECORD"
                ));
            }
            (Mode::Repeated, Mode::Nullable) => {
                self.log_error(format!(
                    "Leaving schema for \"{full_old_name}\" as REPEATED RECORD"
                ));
            }
            (old_mode, new_mode) if old_mode != new_mode => {
                let Some(mode) = self.merge_mode(&old, &new, base_path) else {
                    return Ok(None);
                };
                old.info.mode = mode;
            }
            _ => {}
        }

        let (FieldKind::Record(old_fields), FieldKind::Record(new_fields)) =
            (&mut old.info.kind, new.info.kind)
        else {
            return Err(Error::internal(format!(
                "RECORD merge for \"{full_old_name}\" without sub-fields"
            )));
        };
        self.merge_fields_into(old_fields, new_fields, full_old_name)?;
        Ok(Some(old))
    }

    /// Decide the mode of a merged non-RECORD field, or `None` to drop it
    ///
    /// REQUIRED can only come from an imported schema, so the only legal
    /// transition is REQUIRED -> NULLABLE: a filled value keeps REQUIRED, an
    /// unfilled one relaxes to NULLABLE under mode inference and drops the
    /// field otherwise.
    pub(super) fn merge_mode(
        &mut self,
        old: &SchemaEntry,
        new: &SchemaEntry,
        base_path: &str,
    ) -> Option<Mode> {
        let old_mode = old.info.mode;
        let new_mode = new.info.mode;

        if old_mode == Mode::Required && new_mode == Mode::Nullable {
            if new.filled {
                return Some(old_mode);
            }
            if self.config.infer_mode {
                return Some(new_mode);
            }
            let old_desc = old.describe(&json_full_path(base_path, &old.info.name));
            let new_desc = new.describe(&json_full_path(base_path, &new.info.name));
            self.log_error(format!(
                "Ignoring non-RECORD field with mismatched mode. cannot convert to NULLABLE \
                 because infer_schema not set: old={old_desc}; new={new_desc}"
            ));
            return None;
        }

        if old_mode != new_mode {
            let old_desc = old.describe(&json_full_path(base_path, &old.info.name));
            let new_desc = new.describe(&json_full_path(base_path, &new.info.name));
            self.log_error(format!(
                "Ignoring non-RECORD field with mismatched mode: old={old_desc}; new={new_desc}"
            ));
            return None;
        }
        Some(old_mode)
    }

    // ========================================================================
    // Map-level merging
    // ========================================================================

    /// Merge two whole maps, e.g. partial results of separate record streams
    pub fn merge_schema_maps(&mut self, old: SchemaMap, new: SchemaMap) -> Result<SchemaMap> {
        let mut merged = old;
        self.merge_fields_into(&mut merged, new, "")?;
        Ok(merged)
    }

    /// Merge every slot of `new_fields` into `old_fields`
    ///
    /// Keys only in `new_fields` start unfilled (unless `old_fields` is
    /// untouched), keys only in `old_fields` are marked as not supplied,
    /// and a dropped slot on either side stays dropped.
    pub(super) fn merge_fields_into(
        &mut self,
        old_fields: &mut SchemaMap,
        new_fields: SchemaMap,
        base_path: &str,
    ) -> Result<()> {
        if old_fields.is_untouched() {
            *old_fields = new_fields;
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(new_fields.len());
        for (key, slot) in new_fields.into_slots() {
            seen.insert(key.clone());
            if old_fields.is_dropped(&key) {
                continue;
            }
            let Some(mut new_entry) = slot else {
                old_fields.insert(key, None);
                continue;
            };

            let old_entry = old_fields.take(&key).flatten();
            if old_entry.is_none() {
                new_entry.filled = false;
            }
            let merged = self.merge_schema_entry(old_entry, new_entry, base_path)?;
            old_fields.insert(key, merged);
        }

        self.mark_absent_fields(old_fields, &seen, base_path);
        Ok(())
    }

    /// Mark every live field whose key is not in `present` as not supplied
    pub(super) fn mark_absent_fields(
        &mut self,
        schema_map: &mut SchemaMap,
        present: &HashSet<String>,
        base_path: &str,
    ) {
        let absent: Vec<String> = schema_map
            .iter()
            .filter(|(key, _)| !present.contains(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect();

        for key in absent {
            if let Some(entry) = schema_map.take(&key).flatten() {
                let kept = self.mark_missing(entry, base_path);
                schema_map.insert(key, kept);
            }
        }
    }

    /// A record did not supply this field at all
    ///
    /// Same outcome as merging in an unfilled NULLABLE value of the same
    /// type: REQUIRED relaxes or drops, everything else just loses `filled`.
    fn mark_missing(&mut self, mut entry: SchemaEntry, base_path: &str) -> Option<SchemaEntry> {
        entry.filled = false;
        if entry.info.mode != Mode::Required {
            return Some(entry);
        }

        let kind = match &entry.info.kind {
            FieldKind::Scalar(scalar) => FieldKind::Scalar(*scalar),
            FieldKind::Record(_) => FieldKind::Record(SchemaMap::new()),
        };
        let absent = SchemaEntry::soft(FieldInfo {
            name: entry.info.name.clone(),
            mode: Mode::Nullable,
            kind,
        });
        let mode = self.merge_mode(&entry, &absent, base_path)?;
        entry.info.mode = mode;
        Some(entry)
    }
}
