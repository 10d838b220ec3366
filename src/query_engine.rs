use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;
use std::time::Instant;

use crate::data_models::{Match, SearchStats};
use crate::qgram_index::QGramIndex;

/// Q-gram length used for every index built by the engine.
pub const DEFAULT_Q: usize = 3;

/// One ranked hit, resolved against the index so it can outlive the lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub name: String,
    pub score: i64,
    pub ped: usize,
    pub via: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub normalized: String,
    pub total_matches: usize,
    pub top: Vec<RankedEntity>,
    pub stats: SearchStats,
    pub took_ms: f64,
}

pub struct QueryEngine {
    index: QGramIndex,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(index: QGramIndex, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Builds a q-gram index over the entity file and wraps it.
    pub fn from_file(path: impl AsRef<Path>, use_synonyms: bool, top_k: usize) -> Result<Self> {
        let path = path.as_ref();
        let start = Instant::now();
        let mut index = QGramIndex::new(DEFAULT_Q, use_synonyms);
        index
            .build_from_file(path)
            .with_context(|| format!("Failed to build index from {}", path.display()))?;
        log::info!(
            "Built index over {} entities from {} in {} ms",
            index.num_entities(),
            path.display(),
            start.elapsed().as_millis()
        );
        Ok(Self::new(index, top_k))
    }

    pub fn index(&self) -> &QGramIndex {
        &self.index
    }

    /// Fuzzy prefix search allowing one error per four query characters.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let start = Instant::now();
        let normalized = QGramIndex::normalize(query);
        let delta = normalized.chars().count() / 4;

        let (matches, stats) = if normalized.is_empty() {
            (Vec::new(), SearchStats::default())
        } else {
            self.index.find_matches(&normalized, delta)
        };
        let total_matches = matches.len();

        let top = QGramIndex::rank_matches(matches)
            .into_iter()
            .take(self.top_k)
            .filter_map(|m| self.resolve(m))
            .collect();

        SearchOutcome {
            query: query.to_string(),
            normalized,
            total_matches,
            top,
            stats,
            took_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    fn resolve(&self, m: Match) -> Option<RankedEntity> {
        let entity = self.index.entity(m.entity_id)?;
        let via = self.index.name(m.name_id)?;
        Some(RankedEntity {
            name: entity.name.clone(),
            score: m.score,
            ped: m.ped,
            via: via.to_string(),
            description: entity.description.clone(),
        })
    }
}

/// Renders an outcome as the HTML fragment the search API hands to clients.
///
/// A query that normalises to nothing renders as an empty string.
pub fn render_html(outcome: &SearchOutcome) -> String {
    if outcome.normalized.is_empty() {
        return String::new();
    }
    let stats = &outcome.stats;
    let mut html = String::new();
    let _ = write!(
        html,
        "Got {} result(s), merged {} lists with tot. {} elements ({:.3} ms), \
         {}/{} ped calculations ({:.3} ms), took {:.3} ms total.",
        outcome.total_matches,
        stats.lists_merged,
        stats.elements_merged,
        stats.merge_time_ms,
        stats.ped_calcs,
        stats.candidates,
        stats.ped_time_ms,
        outcome.took_ms
    );
    html.push_str("<br><br><table>");
    for entity in &outcome.top {
        let _ = write!(
            html,
            "<tr><td>{} (score={}, ped={}, via '{}')</td><td>{}</td></tr>",
            escape_html(&entity.name),
            entity.score,
            entity.ped,
            escape_html(&entity.via),
            escape_html(&entity.description)
        );
    }
    html.push_str("</table>");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[test]
fn test_escape_html() {
    assert_eq!(escape_html("plain"), "plain");
    assert_eq!(
        escape_html("<script>alert('x') & \"y\"</script>"),
        "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
    );
}
