use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// A read-only catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub target: String,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            target: row.get("target")?,
        })
    }
}

/// A catalog entry that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedExercise {
    pub name: &'static str,
    pub target: &'static str,
}

/// Seeded into an empty `exercises` table on startup.
pub const DEFAULT_CATALOG: &[SeedExercise] = &[
    SeedExercise { name: "Push-up", target: "Chest" },
    SeedExercise { name: "Bench Press", target: "Chest" },
    SeedExercise { name: "Pull-up", target: "Back" },
    SeedExercise { name: "Barbell Row", target: "Back" },
    SeedExercise { name: "Deadlift", target: "Back" },
    SeedExercise { name: "Squat", target: "Legs" },
    SeedExercise { name: "Lunge", target: "Legs" },
    SeedExercise { name: "Overhead Press", target: "Shoulders" },
    SeedExercise { name: "Lateral Raise", target: "Shoulders" },
    SeedExercise { name: "Bicep Curl", target: "Arms" },
    SeedExercise { name: "Tricep Dip", target: "Arms" },
    SeedExercise { name: "Plank", target: "Core" },
];
