use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ghwrapped_core::{Insights, StatsRecord};

pub fn print_stats(record: &StatsRecord, insights: &Insights) {
    println!("\n  {}\n", format!("{}'s GitHub Wrapped", record.display_name).cyan());

    if !insights.has_commits {
        println!("{}", "  This user doesn't have any commits.".yellow());
        println!("{}", "  Try again with another username.\n".bright_black());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Total commits".to_string(), format_with_commas(record.total_commits)]);
    table.add_row(vec!["Repositories".to_string(), format_with_commas(record.total_repo_count)]);
    table.add_row(vec!["Stars".to_string(), format_with_commas(record.total_stars)]);
    table.add_row(vec!["Pull requests".to_string(), format_with_commas(record.total_pull_requests)]);
    table.add_row(vec!["Issues".to_string(), format_with_commas(record.total_issues)]);
    table.add_row(vec![
        "Repositories created this year".to_string(),
        format_with_commas(record.total_repository_contributions),
    ]);
    table.add_row(vec![
        "Pull requests this year".to_string(),
        format_with_commas(record.total_pull_request_contributions),
    ]);
    table.add_row(vec![
        "Issues this year".to_string(),
        format_with_commas(record.total_issue_contributions),
    ]);
    table.add_row(vec!["Public repositories".to_string(), record.public_repo_count.to_string()]);
    table.add_row(vec!["Private repositories".to_string(), record.private_repo_count.to_string()]);
    table.add_row(vec!["Total repository size".to_string(), format_size_kb(record.total_repo_size_kb)]);
    table.add_row(vec![
        "Longest streak without committing".to_string(),
        format!("{} days", record.longest_zero_activity_streak),
    ]);
    println!("{table}");

    if !insights.language_shares.is_empty() {
        println!("\n  {}", "Most used languages".bold());
        print_language_table(insights);
    }

    if !record.topics.is_empty() {
        println!("\n  {}", "Repository topics".bold());
        println!("  {}", record.topics.join(", "));
    }

    println!("\n  {}", "Insights".bold());
    match &insights.busiest_month {
        Some(bucket) => println!(
            "  Busiest month: {} ({} contributions)",
            bucket.month,
            format_with_commas(bucket.count)
        ),
        None => println!("{}", "  No contributions in the last five years".bright_black()),
    }
    println!(
        "  Total contributions (last 5 years): {}",
        format_with_commas(insights.total_last_five_years)
    );
    println!();
}

pub fn print_monthly(record: &StatsRecord) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Month", "Contributions"]);

    for bucket in &record.monthly_contributions {
        table.add_row(vec![bucket.month.clone(), format_with_commas(bucket.count)]);
    }

    println!("{table}");

    let total: u64 = record.monthly_contributions.iter().map(|b| b.count).sum();
    println!("\nTotal: {}", format_with_commas(total));
}

pub fn print_languages(insights: &Insights) {
    if insights.language_shares.is_empty() {
        println!("{}", "  No languages found.".bright_black());
        return;
    }
    print_language_table(insights);
}

fn print_language_table(insights: &Insights) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Language", "Size", "Share"]);

    for share in &insights.language_shares {
        table.add_row(vec![
            share.name.clone(),
            format_bytes(share.size),
            format!("{:.1}%", share.percent),
        ]);
    }

    println!("{table}");
}

pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

pub fn format_bytes(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1} GB", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.1} MB", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1} KB", n as f64 / 1_000.0)
    } else {
        format!("{} B", n)
    }
}

pub fn format_size_kb(kb: u64) -> String {
    format_bytes(kb.saturating_mul(1_000))
}
