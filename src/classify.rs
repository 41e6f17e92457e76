//! Turning an edit script into change records and added/removed sets

use crate::align::{OpTag, Opcode, SequenceMatcher};
use crate::feature::Feature;
use serde::Serialize;
use std::fmt;

/// One semantic change; indices are 1-based positions in each sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeRecord {
    Unchanged { base: usize, head: usize },
    Deleted { base: usize },
    Inserted { head: usize },
    Replaced { base: usize, head: usize },
}

impl ChangeRecord {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged { base, head } => {
                write!(f, "Keep old feature {} as new feature {}", base, head)
            }
            Self::Deleted { base } => write!(f, "Delete old feature {}", base),
            Self::Inserted { head } => write!(f, "Insert new feature {}", head),
            Self::Replaced { base, head } => {
                write!(f, "Replace old feature {} with new feature {}", base, head)
            }
        }
    }
}

/// Classification switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Emit an `Unchanged` record for every element of an equal run
    pub include_unchanged: bool,
}

/// Change records plus the features on each side of the diff
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffResult {
    pub records: Vec<ChangeRecord>,
    pub added: Vec<Feature>,
    pub removed: Vec<Feature>,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        self.records.iter().any(ChangeRecord::is_change)
    }

    /// Number of records that describe an actual change
    pub fn change_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_change()).count()
    }
}

/// Classify opcodes over `base` and `head`
pub fn classify(opcodes: &[Opcode], base: &[Feature], head: &[Feature]) -> DiffResult {
    classify_with(opcodes, base, head, ClassifyOptions::default())
}

pub fn classify_with(
    opcodes: &[Opcode],
    base: &[Feature],
    head: &[Feature],
    options: ClassifyOptions,
) -> DiffResult {
    let mut ordered: Vec<&Opcode> = opcodes.iter().collect();
    ordered.sort_by_key(|o| (o.i1, o.j1));

    let mut result = DiffResult::default();
    for o in ordered {
        match o.tag {
            OpTag::Delete => {
                result
                    .records
                    .extend((o.i1..o.i2).map(|i| ChangeRecord::Deleted { base: i + 1 }));
                result.removed.extend_from_slice(&base[o.i1..o.i2]);
            }
            OpTag::Insert => {
                result
                    .records
                    .extend((o.j1..o.j2).map(|j| ChangeRecord::Inserted { head: j + 1 }));
                result.added.extend_from_slice(&head[o.j1..o.j2]);
            }
            OpTag::Replace => {
                result.records.push(ChangeRecord::Replaced {
                    base: o.i1 + 1,
                    head: o.j1 + 1,
                });
                result.removed.extend_from_slice(&base[o.i1..o.i2]);
                result.added.extend_from_slice(&head[o.j1..o.j2]);
            }
            OpTag::Equal => {
                if options.include_unchanged {
                    result.records.extend((0..o.i2 - o.i1).map(|k| ChangeRecord::Unchanged {
                        base: o.i1 + k + 1,
                        head: o.j1 + k + 1,
                    }));
                }
            }
        }
    }

    result
}

/// Align and classify in one step
pub fn diff_features(base: &[Feature], head: &[Feature], options: ClassifyOptions) -> (Vec<Opcode>, DiffResult) {
    let opcodes = SequenceMatcher::new(base, head).opcodes();
    let result = classify_with(&opcodes, base, head, options);
    (opcodes, result)
}
