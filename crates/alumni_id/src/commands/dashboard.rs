//! Dashboard command - lists the IDs generated on this device.

use storage::{SqliteRecordIndex, load_dashboard};

/// Runs the dashboard command. Loading is best-effort and never fails.
pub async fn run(index: &SqliteRecordIndex) {
    let list = load_dashboard(index).await;

    if list.is_empty() {
        println!("No alumni IDs yet.");
        return;
    }

    println!("Generated IDs");
    for record in &list {
        println!(
            "{}  {}  {} · {}",
            record.id,
            record.created_at.format("%Y-%m-%d"),
            record.full_name,
            record.school,
        );
    }
}
