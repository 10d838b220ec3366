use serde::{Deserialize, Serialize};

/// One row of the entity file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub score: i64,
    pub description: String,
    pub synonyms: Vec<String>,
}

impl Entity {
    pub fn new(name: String, score: i64, description: String, synonyms: Vec<String>) -> Entity {
        Entity {
            name,
            score,
            description,
            synonyms,
        }
    }
}

/// A fuzzy match of a query prefix against one entity.
///
/// `entity_id` and `name_id` are one-based; `name_id` identifies the name
/// (primary name or synonym) that produced the match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub entity_id: usize,
    pub ped: usize,
    pub score: i64,
    pub name_id: usize,
}

impl Match {
    pub fn new(entity_id: usize, ped: usize, score: i64, name_id: usize) -> Match {
        Match {
            entity_id,
            ped,
            score,
            name_id,
        }
    }
}

/// Counters and timings collected while answering one query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub lists_merged: usize,
    pub elements_merged: usize,
    pub merge_time_ms: f64,
    pub ped_calcs: usize,
    pub candidates: usize,
    pub ped_time_ms: f64,
}
