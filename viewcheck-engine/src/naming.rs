use std::collections::HashSet;

use tracing::{info, warn};
use viewcheck_core::document::Document;

use crate::errors::EngineError;
use crate::scale::ScalePartition;

/// Drawing alphabet without letters that read ambiguously on a drawing.
pub const DEFAULT_LETTERS: [&str; 24] = [
    "А", "Б", "В", "Г", "Д", "Е", "Ж", "И", "К", "Л", "М", "Н", "П", "Р", "С", "Т", "У", "Ф", "Ц",
    "Ш", "Щ", "Э", "Ю", "Я",
];
pub const DEFAULT_NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
pub const DEFAULT_GENERATIONS: usize = 5;

/// Generates view names: every letter bare, then every letter with the first
/// numeral, then the second, up to `generations` numerals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSequencer {
    letters: Vec<String>,
    numerals: Vec<String>,
    generations: usize,
}

impl NameSequencer {
    pub fn new(
        letters: Vec<String>,
        numerals: Vec<String>,
        generations: usize,
    ) -> Result<Self, EngineError> {
        if letters.is_empty() {
            return Err(EngineError::InvalidNamingScheme(
                "alphabet is empty".to_string(),
            ));
        }
        if let Some(duplicate) = first_duplicate(&letters) {
            return Err(EngineError::InvalidNamingScheme(format!(
                "letter `{duplicate}` appears twice"
            )));
        }
        if let Some(duplicate) = first_duplicate(&numerals) {
            return Err(EngineError::InvalidNamingScheme(format!(
                "numeral `{duplicate}` appears twice"
            )));
        }
        if generations > numerals.len() {
            return Err(EngineError::InvalidNamingScheme(format!(
                "{generations} generations need at least as many numerals, got {}",
                numerals.len()
            )));
        }
        let sequencer = Self {
            letters,
            numerals,
            generations,
        };
        // a letter may collide with another letter plus a numeral
        let names: Vec<String> = sequencer.names().collect();
        if let Some(duplicate) = first_duplicate(&names) {
            return Err(EngineError::InvalidNamingScheme(format!(
                "name `{duplicate}` would be generated twice"
            )));
        }
        Ok(sequencer)
    }

    #[inline]
    pub fn letters(&self) -> &[String] {
        &self.letters
    }

    #[inline]
    pub fn numerals(&self) -> &[String] {
        &self.numerals
    }

    #[inline]
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Number of distinct names the scheme produces.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.letters.len() * (self.generations + 1)
    }

    /// Full sequence, generation-major then letter order.
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        let bare = self.letters.iter().cloned();
        let suffixed = self.numerals[..self.generations].iter().flat_map(move |numeral| {
            self.letters
                .iter()
                .map(move |letter| format!("{letter}{numeral}"))
        });
        bare.chain(suffixed)
    }

    /// First `count` names; never more than `capacity()`.
    pub fn generate(&self, count: usize) -> Vec<String> {
        self.names().take(count).collect()
    }

    /// Renames labeled views using the whole sequence as the pool.
    pub fn assign(&self, document: &mut Document, candidates: usize) -> RenameOutcome {
        assign_names(document, candidates, &self.generate(self.capacity()))
    }
}

fn first_duplicate(values: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(String::as_str)
        .find(|value| !seen.insert(*value))
}

impl Default for NameSequencer {
    fn default() -> Self {
        Self {
            letters: DEFAULT_LETTERS.iter().map(|s| s.to_string()).collect(),
            numerals: DEFAULT_NUMERALS.iter().map(|s| s.to_string()).collect(),
            generations: DEFAULT_GENERATIONS,
        }
    }
}

/// What the rename pass did. Skips are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { count: usize },
    NoCandidates,
    /// The pool cannot safely cover the views: either the candidates are not
    /// strictly fewer than the names, or there are more labeled views than names.
    Ambiguous {
        candidates: usize,
        labeled: usize,
        capacity: usize,
    },
}

/// Gives every labeled view the next name from `names` in traversal order,
/// provided `candidates` is strictly below the pool size. Unlabeled views keep
/// their names and do not consume a slot.
pub fn assign_names(document: &mut Document, candidates: usize, names: &[String]) -> RenameOutcome {
    if candidates == 0 {
        return RenameOutcome::NoCandidates;
    }
    let capacity = names.len();
    let labeled = document.views().filter(|(_, view)| view.show_label).count();
    if candidates >= capacity || labeled > capacity {
        warn!(candidates, labeled, capacity, "name pool too small, views keep their names");
        return RenameOutcome::Ambiguous {
            candidates,
            labeled,
            capacity,
        };
    }

    let mut pool = names.iter();
    let mut count = 0;
    for view in document.views_mut().filter(|view| view.show_label) {
        if let Some(name) = pool.next() {
            view.name.clone_from(name);
            count += 1;
        }
    }
    info!(count, "views renamed");
    RenameOutcome::Renamed { count }
}

/// Renames a drawing using a previously computed scale partition as the
/// candidate set.
pub fn rename_views(
    document: &mut Document,
    partition: &ScalePartition,
    sequencer: &NameSequencer,
) -> RenameOutcome {
    sequencer.assign(document, partition.candidate_count())
}
