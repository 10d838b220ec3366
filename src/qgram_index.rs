use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::data_models::{Entity, Match, SearchStats};
use crate::error::IndexError;
use crate::ped::ped;

/// `(name_id, frequency)` pairs, sorted by name id.
pub type InvertedList = Vec<(usize, usize)>;

/// Merges inverted lists into one list sorted by name id, summing the
/// frequencies of ids that appear in more than one list.
pub fn merge_lists(lists: &[&[(usize, usize)]]) -> InvertedList {
    let mut all: Vec<(usize, usize)> = lists.iter().flat_map(|l| l.iter().copied()).collect();
    all.sort_unstable();

    let mut merged: InvertedList = Vec::with_capacity(all.len());
    for (id, freq) in all {
        match merged.last_mut() {
            Some(last) if last.0 == id => last.1 += freq,
            _ => merged.push((id, freq)),
        }
    }
    merged
}

#[test]
fn test_merge_lists() {
    {
        let l1 = vec![(1, 2), (3, 1), (5, 1)];
        let l2 = vec![(2, 1), (3, 2), (9, 2)];
        let got = merge_lists(&[&l1, &l2]);
        assert_eq!(got, vec![(1, 2), (2, 1), (3, 3), (5, 1), (9, 2)]);
    }

    {
        let l1 = vec![(1, 2), (3, 1), (5, 1)];
        let l2: Vec<(usize, usize)> = vec![];
        let got = merge_lists(&[&l1, &l2]);
        assert_eq!(got, l1);
    }

    {
        let l1: Vec<(usize, usize)> = vec![];
        let l2: Vec<(usize, usize)> = vec![];
        assert!(merge_lists(&[&l1, &l2]).is_empty());
    }

    assert!(merge_lists(&[]).is_empty());
}

/// An inverted index from q-grams of normalised entity names to the names
/// containing them, used for fuzzy prefix search.
///
/// Entity ids and name ids are one-based. Every entity contributes its
/// primary name and, when synonyms are enabled, each of its synonyms as a
/// separate name.
#[derive(Debug)]
pub struct QGramIndex {
    q: usize,
    padding: String,
    use_synonyms: bool,
    inverted_lists: HashMap<String, InvertedList>,
    entities: Vec<Entity>,
    names: Vec<String>,
    norm_names: Vec<String>,
    name_entity: Vec<usize>,
}

impl QGramIndex {
    pub fn new(q: usize, use_synonyms: bool) -> Self {
        let q = q.max(1);
        Self {
            q,
            padding: "$".repeat(q - 1),
            use_synonyms,
            inverted_lists: HashMap::new(),
            entities: Vec::new(),
            names: Vec::new(),
            norm_names: Vec::new(),
            name_entity: Vec::new(),
        }
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn inverted_lists(&self) -> &HashMap<String, InvertedList> {
        &self.inverted_lists
    }

    pub fn build_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let file = File::open(path.as_ref())?;
        self.build_from_reader(BufReader::new(file))
    }

    /// Reads one entity per line. The first line is a header and is skipped.
    ///
    /// Columns are tab-separated: name, score, description, and, in the
    /// sixth column, `;`-separated synonyms.
    pub fn build_from_reader<R: BufRead>(&mut self, reader: R) -> Result<(), IndexError> {
        for (line_no, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entity = self.parse_entity(&line, line_no + 1)?;
            self.add_entity(entity);
        }
        log::debug!(
            "Indexed {} entities ({} names, {} q-grams)",
            self.entities.len(),
            self.names.len(),
            self.inverted_lists.len()
        );
        Ok(())
    }

    fn parse_entity(&self, line: &str, line_no: usize) -> Result<Entity, IndexError> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(IndexError::MissingColumns {
                line: line_no,
                found: parts.len(),
            });
        }
        let score = parts[1]
            .trim()
            .parse::<i64>()
            .map_err(|_| IndexError::InvalidScore {
                line: line_no,
                value: parts[1].to_string(),
            })?;
        let synonyms = match parts.get(5) {
            Some(raw) if self.use_synonyms => raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Ok(Entity::new(
            parts[0].to_string(),
            score,
            parts[2].to_string(),
            synonyms,
        ))
    }

    fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
        let entity_id = self.entities.len();
        let entity = &self.entities[entity_id - 1];

        let names: Vec<String> = std::iter::once(entity.name.clone())
            .chain(entity.synonyms.iter().cloned())
            .collect();

        for name in names {
            let norm_name = Self::normalize(&name);
            self.names.push(name);
            self.name_entity.push(entity_id);
            let name_id = self.names.len();

            for qgram in self.compute_qgrams(&norm_name) {
                let list = self.inverted_lists.entry(qgram).or_default();
                match list.last_mut() {
                    Some(last) if last.0 == name_id => last.1 += 1,
                    _ => list.push((name_id, 1)),
                }
            }
            self.norm_names.push(norm_name);
        }
    }

    /// The q-grams of the padded word; there are exactly as many as the word
    /// has characters.
    pub fn compute_qgrams(&self, word: &str) -> Vec<String> {
        let padded: Vec<char> = self.padding.chars().chain(word.chars()).collect();
        let len = word.chars().count();
        (0..len)
            .map(|i| padded[i..i + self.q].iter().collect())
            .collect()
    }

    /// Lowercases the word and drops every non-alphanumeric character.
    pub fn normalize(word: &str) -> String {
        word.chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphanumeric())
            .collect()
    }

    /// Finds every entity with a name `y` such that `PED(prefix, y) <= delta`.
    ///
    /// `prefix` must already be normalised. Only one match per entity is
    /// kept, the one with the smallest PED. The result is sorted by entity id.
    pub fn find_matches(&self, prefix: &str, delta: usize) -> (Vec<Match>, SearchStats) {
        let mut stats = SearchStats::default();
        let threshold = prefix.chars().count() as i64 - (self.q * delta) as i64;

        let lists: Vec<&[(usize, usize)]> = self
            .compute_qgrams(prefix)
            .iter()
            .filter_map(|qgram| self.inverted_lists.get(qgram))
            .map(Vec::as_slice)
            .collect();

        let start = Instant::now();
        let merged = merge_lists(&lists);
        stats.lists_merged = lists.len();
        stats.elements_merged = lists.iter().map(|l| l.len()).sum();
        stats.merge_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let mut matches: Vec<(usize, usize, usize)> = Vec::new();
        for &(name_id, freq) in &merged {
            stats.candidates += 1;
            if (freq as i64) < threshold {
                continue;
            }
            stats.ped_calcs += 1;
            let dist = ped(prefix, &self.norm_names[name_id - 1], delta);
            if dist <= delta {
                matches.push((self.name_entity[name_id - 1], dist, name_id));
            }
        }
        stats.ped_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        matches.sort_unstable();
        let mut result: Vec<Match> = Vec::new();
        for (entity_id, dist, name_id) in matches {
            if result.last().is_some_and(|m| m.entity_id == entity_id) {
                continue;
            }
            let score = self.entities[entity_id - 1].score;
            result.push(Match::new(entity_id, dist, score, name_id));
        }

        (result, stats)
    }

    /// Orders matches by ascending PED, then by descending score.
    pub fn rank_matches(mut matches: Vec<Match>) -> Vec<Match> {
        matches.sort_by_key(|m| (m.ped, std::cmp::Reverse(m.score)));
        matches
    }

    /// Looks up an entity by its one-based id.
    pub fn entity(&self, entity_id: usize) -> Option<&Entity> {
        entity_id.checked_sub(1).and_then(|i| self.entities.get(i))
    }

    /// Looks up a name (primary or synonym) by its one-based id.
    pub fn name(&self, name_id: usize) -> Option<&str> {
        name_id
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }
}
