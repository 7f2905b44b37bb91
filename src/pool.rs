// Draft pool loading and lookup.
//
// The pool is a CSV (`dex,name,types,bst,points,tier`) produced once before
// the season; at runtime it is read-only. Only `points` matters to the
// engine; the rest is descriptive data for display.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to read pool file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("duplicate dex {dex} in pool")]
    DuplicateDex { dex: u32 },
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One draftable pokemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolItem {
    /// National dex number; the unique pool key.
    pub dex: u32,
    pub name: String,
    /// Slash-separated type string as it appears in the CSV (e.g. "ghost/poison").
    pub types: String,
    /// Base stat total.
    pub bst: u32,
    /// Point cost against the coach's budget.
    pub points: u32,
    pub tier: String,
}

/// The full pool, indexed by dex for O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    by_dex: HashMap<u32, PoolItem>,
}

impl Pool {
    /// Build a pool from already-parsed items, rejecting duplicate dex keys.
    pub fn from_items(items: Vec<PoolItem>) -> Result<Self, PoolError> {
        let mut by_dex = HashMap::with_capacity(items.len());
        for item in items {
            let dex = item.dex;
            if by_dex.insert(dex, item).is_some() {
                return Err(PoolError::DuplicateDex { dex });
            }
        }
        Ok(Pool { by_dex })
    }

    /// Load the pool from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, PoolError> {
        let path_str = path.as_ref().display().to_string();
        let file = std::fs::File::open(path.as_ref()).map_err(|source| PoolError::Io {
            path: path_str.clone(),
            source,
        })?;
        Self::from_csv_reader(file, &path_str)
    }

    /// Load the pool from any CSV reader (enables testing without temp files).
    pub fn from_csv_reader<R: Read>(rdr: R, path: &str) -> Result<Self, PoolError> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut items = Vec::new();
        for result in reader.deserialize::<PoolItem>() {
            let item = result.map_err(|source| PoolError::Csv {
                path: path.to_string(),
                source,
            })?;
            items.push(item);
        }
        Self::from_items(items)
    }

    /// Look up an item by dex. A missing key is an ordinary outcome (the
    /// caller treats it as "invalid"), never a panic.
    pub fn get(&self, dex: u32) -> Option<&PoolItem> {
        self.by_dex.get(&dex)
    }

    pub fn contains(&self, dex: u32) -> bool {
        self.by_dex.contains_key(&dex)
    }

    pub fn len(&self) -> usize {
        self.by_dex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dex.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolItem> {
        self.by_dex.values()
    }

    /// The `n` best still-available items, sorted by points then bst
    /// descending, name ascending as a stable tiebreak. Used by the CLI's
    /// `top` command.
    pub fn top_available(&self, drafted: &HashSet<u32>, n: usize) -> Vec<&PoolItem> {
        let mut avail: Vec<&PoolItem> = self
            .by_dex
            .values()
            .filter(|item| !drafted.contains(&item.dex))
            .collect();
        avail.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.bst.cmp(&a.bst))
                .then(a.name.cmp(&b.name))
        });
        avail.truncate(n);
        avail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(dex: u32, name: &str, points: u32, bst: u32) -> PoolItem {
        PoolItem {
            dex,
            name: name.to_string(),
            types: "normal".to_string(),
            bst,
            points,
            tier: "B".to_string(),
        }
    }

    #[test]
    fn from_items_indexes_by_dex() {
        let pool = Pool::from_items(vec![item(6, "charizard", 20, 534), item(9, "blastoise", 18, 530)])
            .unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(6).unwrap().name, "charizard");
        assert!(pool.get(151).is_none());
    }

    #[test]
    fn from_items_rejects_duplicate_dex() {
        let err = Pool::from_items(vec![item(6, "charizard", 20, 534), item(6, "charizard", 20, 534)])
            .unwrap_err();
        match err {
            PoolError::DuplicateDex { dex } => assert_eq!(dex, 6),
            other => panic!("expected DuplicateDex, got: {other}"),
        }
    }

    #[test]
    fn from_csv_reader_parses_rows() {
        let csv_data = "\
dex,name,types,bst,points,tier
6,charizard,fire/flying,534,20,S
94,gengar,ghost/poison,500,18,S
143,snorlax,normal,540,16,A
";
        let pool = Pool::from_csv_reader(csv_data.as_bytes(), "inline").unwrap();
        assert_eq!(pool.len(), 3);
        let gengar = pool.get(94).unwrap();
        assert_eq!(gengar.name, "gengar");
        assert_eq!(gengar.types, "ghost/poison");
        assert_eq!(gengar.points, 18);
        assert_eq!(gengar.tier, "S");
    }

    #[test]
    fn from_csv_reader_rejects_malformed_row() {
        let csv_data = "\
dex,name,types,bst,points,tier
6,charizard,fire/flying,534,not-a-number,S
";
        let err = Pool::from_csv_reader(csv_data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, PoolError::Csv { .. }));
    }

    #[test]
    fn top_available_sorts_and_filters() {
        let pool = Pool::from_items(vec![
            item(1, "bulbasaur", 8, 318),
            item(6, "charizard", 20, 534),
            item(9, "blastoise", 18, 530),
            item(3, "venusaur", 18, 525),
        ])
        .unwrap();

        let drafted: HashSet<u32> = [6].into_iter().collect();
        let top = pool.top_available(&drafted, 2);
        let names: Vec<&str> = top.iter().map(|i| i.name.as_str()).collect();
        // charizard drafted; blastoise beats venusaur on bst at equal points.
        assert_eq!(names, vec!["blastoise", "venusaur"]);
    }
}
