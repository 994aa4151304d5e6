use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

const BUILTIN_JSON: &str = include_str!("../data/reference.json");
pub const REFERENCE_VERSION: u32 = 1;

static BUILTIN: OnceCell<ReferenceData> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueMembership {
    pub league_id: i64,
    /// Also the league's directory name under the raw and output roots.
    pub name: String,
    pub teams: Vec<String>,
}

/// League enumeration plus the static team -> league membership lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceData {
    pub version: u32,
    #[serde(default)]
    pub season: String,
    pub leagues: Vec<LeagueMembership>,
}

impl ReferenceData {
    pub fn builtin() -> Result<&'static ReferenceData> {
        BUILTIN.get_or_try_init(|| {
            Self::from_json_str(BUILTIN_JSON).context("parse built-in reference data")
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read reference data {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let data = serde_json::from_str::<ReferenceData>(raw).context("decode reference json")?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<()> {
        if self.version != REFERENCE_VERSION {
            return Err(anyhow!(
                "unsupported reference data version {} (expected {REFERENCE_VERSION})",
                self.version
            ));
        }
        if self.leagues.is_empty() {
            return Err(anyhow!("reference data has no leagues"));
        }
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut teams = HashSet::new();
        for league in &self.leagues {
            if league.league_id <= 0 || !ids.insert(league.league_id) {
                return Err(anyhow!("bad or duplicate league id {}", league.league_id));
            }
            if league.name.trim().is_empty() || !names.insert(league.name.as_str()) {
                return Err(anyhow!("bad or duplicate league name {:?}", league.name));
            }
            for team in &league.teams {
                if !teams.insert(team.as_str()) {
                    return Err(anyhow!("team {team:?} listed in more than one league"));
                }
            }
        }
        Ok(())
    }

    pub fn league_for_team(&self, team_name: &str) -> Option<i64> {
        self.leagues
            .iter()
            .find(|l| l.teams.iter().any(|t| t == team_name))
            .map(|l| l.league_id)
    }

    pub fn league_names(&self) -> impl Iterator<Item = &str> {
        self.leagues.iter().map(|l| l.name.as_str())
    }
}
