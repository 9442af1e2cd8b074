//! Statistics reporting.

use console::style;

use crate::export::ExportStats;

/// Print statistics for an export run.
pub fn print_export_stats(channel: &str, stats: &ExportStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style(format!("Statistics for #{}:", channel)).bold());
    println!("  Messages: {}", stats.messages);
    println!("  Replies:  {}", stats.replies);
    println!("  Total:    {}", stats.total_messages());
    println!("  Images:   {}", stats.attachments);
    println!("  Skipped:  {} (non-image files)", stats.files_skipped);
    if stats.files_failed > 0 {
        println!("  Failed:   {} (downloads)", style(stats.files_failed).yellow());
    }
    println!(
        "  Users:    {} resolved, {} unresolved",
        stats.users_fetched, stats.users_degraded
    );
    if stats.truncated_threads > 0 {
        println!(
            "  Threads:  {} incomplete",
            style(stats.truncated_threads).yellow()
        );
    }
    println!(
        "  Pages:    {} history, {} replies",
        stats.history_pages, stats.reply_pages
    );
    println!("{}", style("═".repeat(50)).dim());
}
