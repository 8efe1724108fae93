//! Playlist database operations
//!
//! Constraint violations (duplicate playlist name, duplicate membership)
//! are expected, recoverable conditions: they come back as structured
//! outcomes rather than errors, so handlers can serialize them directly.

use crate::model::Track;
use crate::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Outcome of a playlist creation attempt
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a membership insert
#[derive(Debug, Clone, Serialize)]
pub struct StoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Create a playlist with a unique display name
pub async fn create_playlist(pool: &SqlitePool, name: &str) -> Result<CreatePlaylistOutcome> {
    let result = sqlx::query("INSERT INTO playlists (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(CreatePlaylistOutcome {
            success: true,
            id: Some(done.last_insert_rowid()),
            name: Some(name.to_string()),
            error: None,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(CreatePlaylistOutcome {
                success: false,
                id: None,
                name: None,
                error: Some("Playlist already exists".to_string()),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// List playlists, most recently created first
pub async fn get_playlists(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, created_at
        FROM playlists
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Playlist {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Add a track to a playlist
///
/// The full serialized track is stored next to the foreign key so
/// rendering the playlist never goes back to a provider.
pub async fn add_to_playlist(
    pool: &SqlitePool,
    playlist_id: i64,
    track: &Track,
) -> Result<StoreOutcome> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM playlist_songs WHERE playlist_id = ? AND song_id = ?",
    )
    .bind(playlist_id)
    .bind(&track.id)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        return Ok(StoreOutcome::failed("Song already in playlist"));
    }

    let json =
        serde_json::to_string(track).map_err(|e| crate::Error::Internal(e.to_string()))?;
    let inserted =
        sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id, song_json) VALUES (?, ?, ?)")
            .bind(playlist_id)
            .bind(&track.id)
            .bind(json)
            .execute(pool)
            .await;

    match inserted {
        Ok(_) => Ok(StoreOutcome::ok()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Ok(StoreOutcome::failed("Playlist not found"))
        }
        Err(e) => Err(e.into()),
    }
}

/// List a playlist's tracks, most recently added first
pub async fn get_playlist_songs(pool: &SqlitePool, playlist_id: i64) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        r#"
        SELECT song_json
        FROM playlist_songs
        WHERE playlist_id = ?
        ORDER BY added_at DESC, id DESC
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    let mut tracks = Vec::with_capacity(rows.len());
    for row in rows {
        let json: String = row.get("song_json");
        match serde_json::from_str::<Track>(&json) {
            Ok(track) => tracks.push(track),
            Err(e) => warn!("Skipping undecodable playlist row: {}", e),
        }
    }

    Ok(tracks)
}
