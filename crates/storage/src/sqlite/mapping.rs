use sqlx::Row;

use crate::repository::{Snapshot, SnapshotKey, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn parse_snapshot_key(s: &str) -> Result<SnapshotKey, StorageError> {
    match s {
        "reading_result" => Ok(SnapshotKey::Result),
        "reading_last_report" => Ok(SnapshotKey::Report),
        _ => Err(StorageError::Serialization(format!(
            "invalid snapshot key: {s}"
        ))),
    }
}

pub(crate) fn map_snapshot_row(row: &sqlx::sqlite::SqliteRow) -> Result<Snapshot, StorageError> {
    let key: String = row.try_get("key").map_err(ser)?;
    Ok(Snapshot {
        key: parse_snapshot_key(&key)?,
        payload: row.try_get("payload").map_err(ser)?,
        saved_at: row.try_get("saved_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_keys_parse_from_their_names() {
        for key in [SnapshotKey::Result, SnapshotKey::Report] {
            assert_eq!(parse_snapshot_key(key.as_str()).unwrap(), key);
        }
        assert!(parse_snapshot_key("reading_draft").is_err());
    }
}
