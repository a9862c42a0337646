//! Custom field survey printed to stdout, ending with a suggested report config.

use std::collections::BTreeMap;

use relscan_core::discovery::{FieldPurpose, FieldSurvey, FieldUsage};
use relscan_core::{FieldCatalog, FieldCatalogEntry, ReportConfig};
use relscan_sync::TrackerClient;
use tracing::warn;

pub async fn run_field_report(
    client: &TrackerClient,
    projects: &[String],
    sample: u32,
) -> anyhow::Result<()> {
    println!("=== Custom field survey ===");
    println!();

    match client.fields().await {
        Ok(defs) => {
            let custom = defs.iter().filter(|d| d.custom).count();
            println!("Instance defines {} fields ({} custom)", defs.len(), custom);
        }
        Err(e) => warn!(error = %e, "failed to fetch field definitions"),
    }

    let mut survey = FieldSurvey::new();
    for project in projects {
        let project = project.trim();
        match client.sample_issues(project, sample).await {
            Ok(page) => {
                println!("Sampled {} issues from {}", page.issues.len(), project);
                for issue in &page.issues {
                    survey.observe(issue, &page.names);
                }
            }
            Err(e) => warn!(project, error = %e, "failed to sample issues"),
        }
    }
    println!();

    if survey.is_empty() {
        println!("No populated custom fields found.");
        return Ok(());
    }

    let report = survey.report();
    let mut by_purpose: BTreeMap<FieldPurpose, Vec<&FieldUsage>> = BTreeMap::new();
    for usage in &report {
        by_purpose.entry(usage.purpose).or_default().push(usage);
    }

    for (purpose, usages) in &by_purpose {
        println!("{}", purpose.label());
        for usage in usages {
            print_usage(usage);
        }
        println!();
    }

    let suggested = suggest_config(&report);
    println!("Suggested report config:");
    println!("{}", serde_json::to_string_pretty(&suggested)?);
    Ok(())
}

fn print_usage(usage: &FieldUsage) {
    let kinds: Vec<&str> = usage.kinds.iter().copied().collect();
    println!(
        "  {:<22} {:<30} used {}x  [{}]",
        usage.field_id,
        usage.field_name,
        usage.usage_count(),
        kinds.join(", ")
    );
    for s in &usage.samples {
        println!("      {}: {}", s.issue_key, s.preview);
    }
}

/// Catalog built from the guesses: each logical name gets every matching
/// field id as a candidate, most used first. Unguessed fields are left out.
fn suggest_config(report: &[&FieldUsage]) -> ReportConfig {
    let mut candidates: BTreeMap<FieldPurpose, Vec<&str>> = BTreeMap::new();
    for usage in report {
        if usage.purpose.logical_name().is_some() {
            candidates
                .entry(usage.purpose)
                .or_default()
                .push(usage.field_id.as_str());
        }
    }

    let entries: Vec<FieldCatalogEntry> = candidates
        .iter()
        .filter_map(|(purpose, ids)| {
            purpose
                .logical_name()
                .map(|name| FieldCatalogEntry::new(name, ids))
        })
        .collect();

    ReportConfig {
        // Purposes are distinct and every entry has at least one id.
        fields: FieldCatalog::new(entries).unwrap_or_default(),
        ..ReportConfig::default()
    }
}
