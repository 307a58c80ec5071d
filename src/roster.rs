use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn indicator_key(self) -> &'static str {
        match self {
            Position::Goalkeeper => "position_GK",
            Position::Defender => "position_DF",
            Position::Midfielder => "position_MF",
            Position::Forward => "position_FW",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }
}

/// Raw player attributes as entered through the form or seeded from the
/// preset roster. Slider bounds are enforced by the input layer; values
/// here are taken at face value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub age: u32,
    pub games: u32,
    pub minutes: f64,
    pub minutes_90s: f64,
    pub shots: u32,
    pub n_injuries: u32,
    pub n_severe_injuries: u32,
    pub position: Option<Position>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            age: 25,
            games: 0,
            minutes: 0.0,
            minutes_90s: 0.0,
            shots: 0,
            n_injuries: 0,
            n_severe_injuries: 0,
            position: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub name: String,
    pub record: PlayerRecord,
}

/// Session-scoped roster, keyed by player name. Insertion order is kept so
/// the dashboard list stays stable across upserts.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn preset() -> Self {
        let mut roster = Self::new();
        for (name, record) in preset_players() {
            roster.upsert(name, record);
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.record)
    }

    pub fn get_at(&self, idx: usize) -> Option<&RosterEntry> {
        self.entries.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Create or update by name. Returns true when a new entry was created.
    pub fn upsert(&mut self, name: impl Into<String>, record: PlayerRecord) -> bool {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == name) {
            existing.record = record;
            false
        } else {
            self.entries.push(RosterEntry { name, record });
            true
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }
}

fn preset_players() -> Vec<(&'static str, PlayerRecord)> {
    vec![
        (
            "Lionel Messi",
            PlayerRecord {
                age: 23,
                games: 14,
                minutes: 1260.0,
                minutes_90s: 14.0,
                shots: 20,
                n_injuries: 2,
                n_severe_injuries: 0,
                position: Some(Position::Forward),
            },
        ),
        (
            "Cristiano Ronaldo",
            PlayerRecord {
                age: 28,
                games: 12,
                minutes: 873.0,
                minutes_90s: 9.7,
                shots: 15,
                n_injuries: 4,
                n_severe_injuries: 1,
                position: Some(Position::Forward),
            },
        ),
        (
            "Sergio Ramos",
            PlayerRecord {
                age: 31,
                games: 8,
                minutes: 701.0,
                minutes_90s: 7.8,
                shots: 9,
                n_injuries: 1,
                n_severe_injuries: 0,
                position: Some(Position::Defender),
            },
        ),
        (
            "Toni Kroos",
            PlayerRecord {
                age: 25,
                games: 15,
                minutes: 1350.0,
                minutes_90s: 15.0,
                shots: 25,
                n_injuries: 3,
                n_severe_injuries: 1,
                position: Some(Position::Midfielder),
            },
        ),
        (
            "Pepe",
            PlayerRecord {
                age: 29,
                games: 10,
                minutes: 900.0,
                minutes_90s: 10.0,
                shots: 12,
                n_injuries: 0,
                n_severe_injuries: 0,
                position: Some(Position::Defender),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_has_five_players() {
        let roster = Roster::preset();
        assert_eq!(roster.len(), 5);
        assert!(roster.get("Lionel Messi").is_some());
        assert!(roster.get("Pepe").is_some());
    }

    #[test]
    fn upsert_creates_then_updates() {
        let mut roster = Roster::new();
        let created = roster.upsert("A. Stone", PlayerRecord::default());
        assert!(created);
        assert_eq!(roster.len(), 1);

        let mut record = PlayerRecord::default();
        record.n_injuries = 3;
        let created = roster.upsert("A. Stone", record);
        assert!(!created);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("A. Stone").unwrap().n_injuries, 3);
    }

    #[test]
    fn insertion_order_is_stable() {
        let mut roster = Roster::new();
        roster.upsert("B", PlayerRecord::default());
        roster.upsert("A", PlayerRecord::default());
        roster.upsert("B", PlayerRecord::default());
        let names: Vec<&str> = roster.names().collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
