//! Localhost mode: treatments served from a split file.
//!
//! The split file holds one `feature treatment` pair per line. Blank lines and lines starting with
//! `#` are ignored.
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use crate::Result;

pub(crate) type Treatments = HashMap<String, String>;

/// Parse split file `contents`. Malformed lines are skipped.
pub(crate) fn parse_split_file(contents: &str) -> Treatments {
    let mut treatments = Treatments::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens = line.split_whitespace().collect::<Vec<_>>();
        match tokens.as_slice() {
            [feature, treatment] => {
                treatments.insert((*feature).to_owned(), (*treatment).to_owned());
            }
            _ => {
                log::warn!(target: "split",
                           line_number = index + 1;
                           "skipping malformed split file line, expected `feature treatment`");
            }
        }
    }

    treatments
}

/// Read and parse the split file at `path`.
///
/// A missing file yields no treatments, so every feature evaluates to control.
pub(crate) fn load_split_file(path: &Path) -> Result<Treatments> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let treatments = parse_split_file(&contents);
            log::debug!(target: "split",
                        features = treatments.len();
                        "loaded split file");
            Ok(treatments)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!(target: "split",
                       split_file:display = path.display();
                       "split file not found, all treatments will be control");
            Ok(Treatments::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// `TreatmentStore` holds the currently active localhost treatments and allows concurrent access
/// for readers (evaluation) and writers (the poller thread).
///
/// Treatments are immutable and can only be replaced completely.
#[derive(Default)]
pub(crate) struct TreatmentStore {
    treatments: RwLock<Arc<Treatments>>,
}

impl TreatmentStore {
    pub(crate) fn new(treatments: Treatments) -> Self {
        TreatmentStore {
            treatments: RwLock::new(Arc::new(treatments)),
        }
    }

    /// Get a snapshot of the active treatments.
    pub(crate) fn get_treatments(&self) -> Arc<Treatments> {
        // Writers only swap an Arc, so a poisoned lock still holds a consistent value.
        self.treatments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active treatments.
    pub(crate) fn set_treatments(&self, treatments: Treatments) {
        // Constructing new value before requesting the lock to minimize lock span.
        let new_value = Arc::new(treatments);

        *self
            .treatments
            .write()
            .unwrap_or_else(PoisonError::into_inner) = new_value;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::{load_split_file, parse_split_file, TreatmentStore};

    #[test]
    fn parses_feature_treatment_pairs() {
        let treatments = parse_split_file(
            "
            # comment
            new-checkout on

            discount 15
            ui-config {\"theme\":\"dark\"}
            ",
        );

        assert_eq!(
            treatments,
            HashMap::from([
                ("new-checkout".to_owned(), "on".to_owned()),
                ("discount".to_owned(), "15".to_owned()),
                ("ui-config".to_owned(), "{\"theme\":\"dark\"}".to_owned()),
            ])
        );
    }

    #[test]
    fn skips_malformed_lines() {
        let treatments = parse_split_file("lonely\ntoo many tokens\nok on\n");

        assert_eq!(
            treatments,
            HashMap::from([("ok".to_owned(), "on".to_owned())])
        );
    }

    #[test]
    fn later_lines_override_earlier_ones() {
        let treatments = parse_split_file("flag on\nflag off\n");

        assert_eq!(treatments.get("flag").map(String::as_str), Some("off"));
    }

    #[test]
    fn missing_file_yields_no_treatments() {
        let treatments = load_split_file("does/not/exist.split".as_ref()).unwrap();

        assert!(treatments.is_empty());
    }

    #[test]
    fn can_set_treatments_from_another_thread() {
        let store = Arc::new(TreatmentStore::default());

        {
            let store = store.clone();
            let _ = std::thread::spawn(move || {
                store.set_treatments(HashMap::from([("flag".to_owned(), "on".to_owned())]));
            })
            .join();
        }

        assert_eq!(
            store.get_treatments().get("flag").map(String::as_str),
            Some("on")
        );
    }
}
