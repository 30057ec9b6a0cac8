//! Team model

use serde::{Deserialize, Serialize};

use crate::models::report::MissionRef;

/// Statically configured team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,

    /// Display name; also the tag matched in remote issue titles
    pub name: String,

    /// Logo path or URL
    #[serde(default)]
    pub logo: String,

    /// Ordered mission list
    #[serde(default)]
    pub missions: Vec<String>,

    /// Team password (plaintext)
    #[serde(default)]
    pub password: String,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>, missions: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            logo: String::new(),
            missions,
            password: String::new(),
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = logo.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Resolve a 0-based mission index to a denormalized reference
    pub fn mission(&self, index: usize) -> Option<MissionRef> {
        self.missions.get(index).map(|text| MissionRef {
            index,
            text: text.clone(),
        })
    }

    /// Label carried by this team's remote issues
    pub fn label(&self) -> String {
        team_label(self.id)
    }
}

/// Remote label for a team id
pub fn team_label(team_id: u32) -> String {
    format!("team-{}", team_id)
}

/// Find a team by id
pub fn find_team(teams: &[Team], id: u32) -> Option<&Team> {
    teams.iter().find(|t| t.id == id)
}

/// Find a team by exact display name
pub fn find_team_by_name<'a>(teams: &'a [Team], name: &str) -> Option<&'a Team> {
    teams.iter().find(|t| t.name == name)
}
