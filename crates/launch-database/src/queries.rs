//! Standalone query functions that work with any Connection.
//!
//! Each function takes a `&Connection` (or `&mut Connection` when it opens a
//! transaction) as its first parameter.

use crate::{DatabaseError, DatabaseResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use launch_sync_core::{LaunchId, LaunchRecord, Subscriber, SubscriberDelta};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use tracing::debug;

/// Storage format for launch instants.
pub const NET_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_net(net: &DateTime<Utc>) -> String {
    net.format(NET_FORMAT).to_string()
}

pub fn parse_net(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, NET_FORMAT).map(|naive| naive.and_utc())
}

fn launch_from_row(row: &Row<'_>) -> rusqlite::Result<LaunchRecord> {
    let raw_net: String = row.get(2)?;
    let net = parse_net(&raw_net)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(LaunchRecord {
        id: LaunchId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        net,
        status: row.get(3)?,
    })
}

// ==========================================
// Launches
// ==========================================

/// List all launches ordered by id.
pub fn list_launches(conn: &Connection) -> DatabaseResult<Vec<LaunchRecord>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, name, net, status FROM launches ORDER BY id")?;
    let launches = stmt
        .query_map([], launch_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(launches)
}

/// Get a launch by id.
pub fn get_launch(conn: &Connection, id: &str) -> DatabaseResult<Option<LaunchRecord>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, name, net, status FROM launches WHERE id = ?1")?;
    match stmt.query_row(params![id], launch_from_row) {
        Ok(launch) => Ok(Some(launch)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert a launch that is not stored yet.
pub fn insert_launch(conn: &Connection, launch: &LaunchRecord) -> DatabaseResult<()> {
    let inserted = conn.execute(
        "INSERT INTO launches (id, name, net, status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO NOTHING",
        params![
            launch.id.as_str(),
            launch.name,
            format_net(&launch.net),
            launch.status,
            Utc::now().to_rfc3339(),
        ],
    )?;
    if inserted == 0 {
        return Err(DatabaseError::AlreadyExists(format!("launch {}", launch.id)));
    }
    debug!(launch_id = %launch.id, "Launch inserted");
    Ok(())
}

/// Overwrite a stored launch with new values.
pub fn update_launch(conn: &Connection, launch: &LaunchRecord) -> DatabaseResult<()> {
    let updated = conn.execute(
        "UPDATE launches SET name = ?2, net = ?3, status = ?4, updated_at = ?5 WHERE id = ?1",
        params![
            launch.id.as_str(),
            launch.name,
            format_net(&launch.net),
            launch.status,
            Utc::now().to_rfc3339(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound(format!("launch {}", launch.id)));
    }
    debug!(launch_id = %launch.id, "Launch updated");
    Ok(())
}

/// Delete a launch by id.
pub fn delete_launch(conn: &Connection, id: &str) -> DatabaseResult<()> {
    let deleted = conn.execute("DELETE FROM launches WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound(format!("launch {id}")));
    }
    debug!(launch_id = id, "Launch deleted");
    Ok(())
}

pub fn count_launches(conn: &Connection) -> DatabaseResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM launches", [], |row| row.get(0))?)
}

// ==========================================
// Subscribers
// ==========================================

/// List subscribers ordered by email.
pub fn list_subscribers(conn: &Connection) -> DatabaseResult<Vec<Subscriber>> {
    let mut stmt = conn.prepare_cached("SELECT email, is_new FROM subscribers ORDER BY email")?;
    let subscribers = stmt
        .query_map([], |row| {
            Ok(Subscriber {
                email: row.get(0)?,
                is_new: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(subscribers)
}

/// Hard-sync the subscriber table to `addresses` in one transaction.
///
/// Unseen addresses are inserted as new; absent ones are deleted; everyone
/// else keeps their flag.
pub fn reconcile_subscribers(
    conn: &mut Connection,
    addresses: &[String],
) -> DatabaseResult<SubscriberDelta> {
    let wanted: HashSet<&str> = addresses.iter().map(String::as_str).collect();
    let tx = conn.transaction()?;

    let stored: Vec<String> = {
        let mut stmt = tx.prepare_cached("SELECT email FROM subscribers")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        rows
    };

    let mut removed = 0;
    for email in stored.iter().filter(|e| !wanted.contains(e.as_str())) {
        removed += tx.execute("DELETE FROM subscribers WHERE email = ?1", params![email])?;
    }

    let mut added = 0;
    for email in &wanted {
        added += tx.execute(
            "INSERT INTO subscribers (email, is_new, added_at) VALUES (?1, 1, ?2)
             ON CONFLICT(email) DO NOTHING",
            params![email, Utc::now().to_rfc3339()],
        )?;
    }

    tx.commit()?;
    debug!(added, removed, "Subscribers reconciled");
    Ok(SubscriberDelta { added, removed })
}

/// Clear every new-subscriber flag.
pub fn mark_all_subscribers_existing(conn: &Connection) -> DatabaseResult<usize> {
    Ok(conn.execute("UPDATE subscribers SET is_new = 0 WHERE is_new = 1", [])?)
}

pub fn count_subscribers(conn: &Connection) -> DatabaseResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM subscribers", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_migrations;
    use chrono::TimeZone;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn launch(id: &str, status: &str) -> LaunchRecord {
        LaunchRecord::new(
            id,
            format!("Launch {id}"),
            Utc.with_ymd_and_hms(2025, 3, 5, 14, 30, 0).unwrap(),
            status,
        )
    }

    #[test]
    fn net_format_roundtrips_to_the_second() {
        let net = Utc.with_ymd_and_hms(2025, 3, 5, 14, 30, 15).unwrap();
        assert_eq!(format_net(&net), "2025-03-05T14:30:15Z");
        assert_eq!(parse_net("2025-03-05T14:30:15Z").unwrap(), net);
        assert!(parse_net("next tuesday").is_err());
    }

    #[test]
    fn insert_update_delete_launch() {
        let conn = conn();
        insert_launch(&conn, &launch("a", "Go")).unwrap();
        update_launch(&conn, &launch("a", "Hold")).unwrap();

        assert_eq!(get_launch(&conn, "a").unwrap(), Some(launch("a", "Hold")));

        delete_launch(&conn, "a").unwrap();
        assert_eq!(get_launch(&conn, "a").unwrap(), None);
        assert_eq!(count_launches(&conn).unwrap(), 0);
    }

    #[test]
    fn insert_existing_launch_is_an_error() {
        let conn = conn();
        insert_launch(&conn, &launch("a", "Go")).unwrap();

        let err = insert_launch(&conn, &launch("a", "Hold")).unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists(_)));
        assert_eq!(get_launch(&conn, "a").unwrap().unwrap().status, "Go");
    }

    #[test]
    fn update_or_delete_missing_launch_is_not_found() {
        let conn = conn();
        assert!(matches!(
            update_launch(&conn, &launch("x", "Go")),
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(delete_launch(&conn, "x"), Err(DatabaseError::NotFound(_))));
    }

    #[test]
    fn corrupt_net_is_reported_not_replaced() {
        let conn = conn();
        conn.execute(
            "INSERT INTO launches (id, name, net, status) VALUES ('bad', 'Bad', 'soon', 'Go')",
            [],
        )
        .unwrap();

        assert!(list_launches(&conn).is_err());
    }

    #[test]
    fn reconcile_subscribers_hard_syncs() {
        let mut conn = conn();
        reconcile_subscribers(&mut conn, &["a@x.io".to_string(), "b@x.io".to_string()]).unwrap();
        mark_all_subscribers_existing(&conn).unwrap();

        let delta =
            reconcile_subscribers(&mut conn, &["b@x.io".to_string(), "c@x.io".to_string()])
                .unwrap();

        assert_eq!(delta, SubscriberDelta { added: 1, removed: 1 });
        assert_eq!(
            list_subscribers(&conn).unwrap(),
            vec![
                Subscriber::new("b@x.io", false),
                Subscriber::new("c@x.io", true),
            ]
        );
    }

    #[test]
    fn mark_all_existing_counts_cleared_flags() {
        let mut conn = conn();
        reconcile_subscribers(&mut conn, &["a@x.io".to_string()]).unwrap();

        assert_eq!(mark_all_subscribers_existing(&conn).unwrap(), 1);
        assert_eq!(mark_all_subscribers_existing(&conn).unwrap(), 0);
        assert_eq!(count_subscribers(&conn).unwrap(), 1);
    }
}
