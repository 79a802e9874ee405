//! `status` command.

use launch_config_and_utils::Paths;
use launch_database::{AsyncDatabase, SqliteStore};

pub async fn status(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = paths.database_file();
    if !db_path.exists() {
        println!("No launch database yet ({})", db_path.display());
        return Ok(());
    }

    let store = SqliteStore::new(AsyncDatabase::open(&db_path).await?);
    let (launches, subscribers) = store.counts().await?;

    println!("Launch database: {}", db_path.display());
    println!("  Launches:    {launches}");
    println!("  Subscribers: {subscribers}");
    Ok(())
}
