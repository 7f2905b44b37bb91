// Season schedule loading.
//
// The schedule is a CSV (`week,match,coach1,coach2,format`) generated before
// the season. Each row is one series (scored 0-2 game wins per side);
// `match_key` derives the stable identifier that match results are
// reported under.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("failed to read schedule file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// One scheduled series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub week: u32,
    #[serde(rename = "match")]
    pub match_no: u32,
    pub coach1: String,
    pub coach2: String,
    pub format: String,
}

impl ScheduledMatch {
    /// Stable identifier a result row is keyed by, e.g. `w3_m2_Billy_vs_Sven`.
    pub fn match_key(&self) -> String {
        format!(
            "w{}_m{}_{}_vs_{}",
            self.week, self.match_no, self.coach1, self.coach2
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    matches: Vec<ScheduledMatch>,
}

impl Schedule {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, ScheduleError> {
        let path_str = path.as_ref().display().to_string();
        let file = std::fs::File::open(path.as_ref()).map_err(|source| ScheduleError::Io {
            path: path_str.clone(),
            source,
        })?;
        Self::from_csv_reader(file, &path_str)
    }

    pub fn from_csv_reader<R: Read>(rdr: R, path: &str) -> Result<Self, ScheduleError> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut matches = Vec::new();
        for result in reader.deserialize::<ScheduledMatch>() {
            matches.push(result.map_err(|source| ScheduleError::Csv {
                path: path.to_string(),
                source,
            })?);
        }
        Ok(Schedule { matches })
    }

    pub fn matches(&self) -> &[ScheduledMatch] {
        &self.matches
    }

    pub fn week(&self, week: u32) -> impl Iterator<Item = &ScheduledMatch> {
        self.matches.iter().filter(move |m| m.week == week)
    }

    /// Find a scheduled match by its derived key.
    pub fn by_key(&self, key: &str) -> Option<&ScheduledMatch> {
        self.matches.iter().find(|m| m.match_key() == key)
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
