//! Selected-county list management.
//!
//! The UI invariant is "there is always at least one input row": the
//! list keeps resolved selections in insertion order, followed by
//! exactly one in-progress entry holding the live input text and its
//! suggestions. Resolved entries are deduplicated by FIPS.

use serde::{Deserialize, Serialize};

/// A county selection resolved against the reference table.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ResolvedCounty {
    pub fips: String,
    pub name: String,
}

/// One row of the county picker, resolved or still being typed.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct SelectedCounty {
    pub input: String,
    pub resolved: Option<ResolvedCounty>,
    pub suggestions: Vec<String>,
    pub show_suggestions: bool,
}

/// Ordered selected-county list with set semantics over FIPS.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectedCounties {
    entries: Vec<SelectedCounty>,
}

impl Default for SelectedCounties {
    fn default() -> Self {
        SelectedCounties {
            entries: vec![SelectedCounty::default()],
        }
    }
}

impl SelectedCounties {
    pub fn entries(&self) -> &[SelectedCounty] {
        &self.entries
    }

    /// FIPS codes of the resolved selections, in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.resolved.as_ref().map(|r| r.fips.clone()))
            .collect()
    }

    /// Number of resolved selections (the trailing input row does not
    /// count).
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.resolved.is_some()).count()
    }

    /// Add a county by id. No-op when the id is already selected; the
    /// in-progress entry is consumed and a fresh one appended.
    pub fn add(&mut self, fips: &str, name: &str) {
        if self.entries.iter().any(|e| {
            e.resolved.as_ref().map(|r| r.fips.as_str()) == Some(fips)
        }) {
            return;
        }
        // Consume the trailing input row as the new selection.
        if let Some(last) = self.entries.last_mut() {
            if last.resolved.is_none() {
                *last = SelectedCounty {
                    input: name.to_string(),
                    resolved: Some(ResolvedCounty {
                        fips: fips.to_string(),
                        name: name.to_string(),
                    }),
                    suggestions: Vec::new(),
                    show_suggestions: false,
                };
                self.entries.push(SelectedCounty::default());
                return;
            }
        }
        self.entries.push(SelectedCounty {
            input: name.to_string(),
            resolved: Some(ResolvedCounty {
                fips: fips.to_string(),
                name: name.to_string(),
            }),
            suggestions: Vec::new(),
            show_suggestions: false,
        });
        self.entries.push(SelectedCounty::default());
    }

    /// Remove a county by id. The list never empties: removing the last
    /// resolved entry leaves exactly one blank in-progress row.
    pub fn remove(&mut self, fips: &str) {
        self.entries.retain(|e| {
            e.resolved.as_ref().map(|r| r.fips.as_str()) != Some(fips)
        });
        if !self.entries.iter().any(|e| e.resolved.is_none()) {
            self.entries.push(SelectedCounty::default());
        }
    }

    /// Update the in-progress entry's input text and suggestion list.
    pub fn set_in_progress(&mut self, input: &str, suggestions: Vec<String>) {
        if let Some(last) = self.entries.last_mut() {
            if last.resolved.is_none() {
                last.input = input.to_string();
                last.show_suggestions = !suggestions.is_empty();
                last.suggestions = suggestions;
            }
        }
    }
}
