//! Library and play-history database operations

use crate::model::{Source, Track};
use crate::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::warn;

/// Saved library row: the track plus its insertion timestamp
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    #[serde(flatten)]
    pub track: Track,
    pub added_at: NaiveDateTime,
}

/// One recorded play
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub track: Track,
    pub played_at: NaiveDateTime,
}

/// Add a track to the library
///
/// Idempotent by track id: a duplicate insert is silently ignored and
/// still reported as success. Returns false only for tracks without an
/// id, which cannot be stored.
pub async fn add_song(pool: &SqlitePool, track: &Track) -> Result<bool> {
    if track.id.is_empty() {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO library (id, title, artist, url, thumbnail, source, duration)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&track.id)
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.url)
    .bind(&track.thumbnail)
    .bind(track.source.as_str())
    .bind(track.duration as i64)
    .execute(pool)
    .await?;

    Ok(true)
}

/// List library entries, most recently added first
pub async fn get_library(pool: &SqlitePool) -> Result<Vec<LibraryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, artist, url, thumbnail, source, duration, added_at
        FROM library
        ORDER BY added_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let source_tag: String = row.get("source");
        let Some(source) = Source::parse(&source_tag) else {
            warn!("Skipping library row with unknown source tag: {}", source_tag);
            continue;
        };
        entries.push(LibraryEntry {
            track: Track {
                id: row.get("id"),
                title: row.get("title"),
                artist: row.get("artist"),
                url: row.get("url"),
                thumbnail: row.get("thumbnail"),
                source,
                duration: row.get::<i64, _>("duration").max(0) as u64,
            },
            added_at: row.get("added_at"),
        });
    }

    Ok(entries)
}

/// Remove a library entry by track id
pub async fn remove_song(pool: &SqlitePool, song_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM library WHERE id = ?")
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Record one play of a track
pub async fn record_play(pool: &SqlitePool, track: &Track) -> Result<()> {
    sqlx::query("INSERT INTO history (song_id, song_json) VALUES (?, ?)")
        .bind(&track.id)
        .bind(serde_json::to_string(track).map_err(|e| crate::Error::Internal(e.to_string()))?)
        .execute(pool)
        .await?;
    Ok(())
}

/// List recent plays, most recent first
pub async fn get_history(pool: &SqlitePool, limit: i64) -> Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT song_json, played_at
        FROM history
        ORDER BY played_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let json: String = row.get("song_json");
        match serde_json::from_str::<Track>(&json) {
            Ok(track) => entries.push(HistoryEntry {
                track,
                played_at: row.get("played_at"),
            }),
            Err(e) => warn!("Skipping undecodable history row: {}", e),
        }
    }

    Ok(entries)
}
