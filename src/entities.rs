use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::categories::Level;
use crate::error::IngestIssue;
use crate::reference_data::ReferenceData;
use crate::transform::{CategoryTable, RowIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub league_id: i64,
    pub league_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub team_id: i64,
    pub team_name: String,
    pub league_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Assigned by the sink at load time.
    pub player_id: Option<i64>,
    pub player_name: String,
    pub nation: String,
    pub position: String,
    pub team_id: Option<i64>,
    pub age: Option<i64>,
    pub date_of_birth: Option<i64>,
}

/// Reference tables for one run. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    leagues: Vec<League>,
    teams: Vec<Team>,
    players: Vec<Player>,
    team_ids: HashMap<String, i64>,
    player_keys: HashSet<(String, Option<i64>)>,
}

impl EntityResolver {
    /// Builds leagues from the enumeration, teams from the squad standard
    /// tables and players from the player standard tables. Tables are taken
    /// in the order given; the first sighting of a team or player wins.
    pub fn build(
        reference: &ReferenceData,
        team_standard: &[&CategoryTable],
        player_standard: &[&CategoryTable],
    ) -> (Self, Vec<IngestIssue>) {
        let mut resolver = EntityResolver {
            leagues: reference
                .leagues
                .iter()
                .map(|l| League {
                    league_id: l.league_id,
                    league_name: l.name.clone(),
                })
                .collect(),
            ..EntityResolver::default()
        };
        let mut issues = Vec::new();

        for table in team_standard {
            for record in &table.records {
                let squad = record.identity.squad();
                if squad.is_empty() || resolver.team_ids.contains_key(squad) {
                    continue;
                }
                let team_id = resolver.teams.len() as i64 + 1;
                let league_id = reference.league_for_team(squad);
                if league_id.is_none() {
                    issues.push(IngestIssue::UnresolvedForeignKey {
                        league: table.league.clone(),
                        entity: "league",
                        name: squad.to_string(),
                    });
                }
                resolver.team_ids.insert(squad.to_string(), team_id);
                resolver.teams.push(Team {
                    team_id,
                    team_name: squad.to_string(),
                    league_id,
                });
            }
        }

        for table in player_standard {
            let mut unresolved = HashSet::new();
            for record in &table.records {
                let RowIdentity::Player(p) = &record.identity else {
                    continue;
                };
                if p.name.is_empty() {
                    continue;
                }
                if !resolver.player_keys.insert((p.name.clone(), p.born)) {
                    continue;
                }
                let team_id = resolver.team_id(&p.squad);
                if team_id.is_none() && unresolved.insert(p.squad.clone()) {
                    issues.push(IngestIssue::UnresolvedForeignKey {
                        league: table.league.clone(),
                        entity: "team",
                        name: p.squad.clone(),
                    });
                }
                resolver.players.push(Player {
                    player_id: None,
                    player_name: p.name.clone(),
                    nation: p.nation.clone(),
                    position: p.position.clone(),
                    team_id,
                    age: p.age,
                    date_of_birth: p.born,
                });
            }
        }

        for issue in &issues {
            warn!("{issue}");
        }
        info!(
            leagues = resolver.leagues.len(),
            teams = resolver.teams.len(),
            players = resolver.players.len(),
            "built reference tables"
        );
        (resolver, issues)
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn team_id(&self, team_name: &str) -> Option<i64> {
        self.team_ids.get(team_name).copied()
    }

    pub fn knows_player(&self, name: &str, born: Option<i64>) -> bool {
        self.player_keys.contains(&(name.to_string(), born))
    }

    /// Fills `team_id` on team-level records. Player-level records keep a null
    /// `player_id` (the sink assigns it); their identity is only checked.
    /// Issues land in the table report.
    pub fn resolve(&self, table: &mut CategoryTable) {
        let mut issues = Vec::new();
        let mut reported = HashSet::new();
        let league = table.league.clone();

        match table.spec.category.level {
            Level::Team => {
                for record in &mut table.records {
                    let squad = record.identity.squad();
                    record.owner_id = self.team_id(squad);
                    if record.owner_id.is_none() && reported.insert(squad.to_string()) {
                        issues.push(IngestIssue::UnresolvedForeignKey {
                            league: league.clone(),
                            entity: "team",
                            name: squad.to_string(),
                        });
                    }
                }
            }
            Level::Player => {
                for record in &mut table.records {
                    record.owner_id = None;
                    let RowIdentity::Player(p) = &record.identity else {
                        continue;
                    };
                    if !self.knows_player(&p.name, p.born) && reported.insert(p.name.clone()) {
                        issues.push(IngestIssue::UnresolvedForeignKey {
                            league: league.clone(),
                            entity: "player",
                            name: p.name.clone(),
                        });
                    }
                }
            }
        }

        for issue in &issues {
            warn!("{issue}");
        }
        table.report.issues.extend(issues);
    }
}
