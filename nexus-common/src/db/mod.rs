//! Database access layer
//!
//! Schema initialization plus the library, history, and playlist queries.
//! Every operation borrows the shared [`sqlx::SqlitePool`]; sqlx scopes
//! connection acquisition per statement, so release happens on all exit
//! paths including errors.

pub mod init;
pub mod library;
pub mod playlists;

pub use init::{create_schema, init_database};
pub use library::{
    add_song, get_history, get_library, record_play, remove_song, HistoryEntry, LibraryEntry,
};
pub use playlists::{
    add_to_playlist, create_playlist, get_playlist_songs, get_playlists, CreatePlaylistOutcome,
    Playlist, StoreOutcome,
};
