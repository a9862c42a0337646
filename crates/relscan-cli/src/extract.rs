//! Extraction pipeline: released versions → issues → flat records → report files.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use futures::StreamExt;
use relscan_core::schema::report;
use relscan_core::{
    CustomFieldResolver, DateRange, IssueRecord, IssueRecordBuilder, ReleaseWindow, ReportConfig,
    filter_matches,
};
use relscan_store::{OutputFormat, report_file_name, write_batch};
use relscan_sync::TrackerClient;
use relscan_sync::http::fix_version_jql;
use tracing::{info, warn};

const RELEASES_PREFIX: &str = "releases";
const ISSUES_PREFIX: &str = "release_issues";
const MATCHES_PREFIX: &str = "keyword_matches";

pub struct ExtractOptions {
    pub projects: Vec<String>,
    pub range: DateRange,
    pub keywords: Vec<String>,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub concurrency: usize,
}

#[derive(Default)]
pub struct ExtractStats {
    pub releases: usize,
    pub records: usize,
    pub matches: usize,
    pub releases_path: Option<PathBuf>,
    pub issues_path: Option<PathBuf>,
    pub matches_path: Option<PathBuf>,
    pub elapsed_secs: f64,
}

impl ExtractStats {
    pub fn print_summary(&self) {
        match &self.releases_path {
            Some(path) => {
                println!("Releases written to: {}", path.display());
                println!("  releases: {}", self.releases);
            }
            None => println!("No data found for the specified criteria"),
        }
        if let Some(path) = &self.issues_path {
            println!("Issues written to: {}", path.display());
            println!("  records:  {}", self.records);
        }
        if let Some(path) = &self.matches_path {
            println!("Keyword matches written to: {}", path.display());
            println!("  matched rows: {}", self.matches);
        }
        println!("  elapsed: {:.1}s", self.elapsed_secs);
    }
}

/// Run the full extraction: select releases, fetch their issues, write the tables.
///
/// A project or release whose fetch fails is logged and skipped; the run
/// continues with whatever was retrieved.
pub async fn run_extract_pipeline(
    client: &TrackerClient,
    config: &ReportConfig,
    options: &ExtractOptions,
) -> anyhow::Result<ExtractStats> {
    let start = Instant::now();
    let mut stats = ExtractStats::default();

    info!(
        projects = ?options.projects,
        start = %options.range.start,
        end = %options.range.end,
        "starting extraction"
    );

    // 1. Released versions per project.
    let mut releases: Vec<ReleaseWindow> = Vec::new();
    for project in &options.projects {
        match client.released_versions(project, &options.range).await {
            Ok(found) => releases.extend(found),
            Err(e) => warn!(project = %project, error = %e, "failed to fetch versions"),
        }
    }
    stats.releases = releases.len();
    if releases.is_empty() {
        warn!("no released versions found in the date range");
        stats.elapsed_secs = start.elapsed().as_secs_f64();
        return Ok(stats);
    }
    info!(count = releases.len(), "found released versions");

    std::fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("creating {}", options.out_dir.display()))?;
    let stamp = chrono::Local::now().naive_local();
    let output_path = |prefix: &str| {
        options
            .out_dir
            .join(report_file_name(prefix, &options.range, stamp, options.format))
    };

    // Release table, written before any issue is fetched so that releases
    // without issues still appear.
    let batch = report::releases_to_batch(&releases).context("building release batch")?;
    let releases_path = output_path(RELEASES_PREFIX);
    write_batch(&releases_path, &batch, options.format).context("writing release table")?;
    stats.releases_path = Some(releases_path);

    // 2. Issues per release, fetched concurrently, kept in release order.
    let builder = IssueRecordBuilder::new(CustomFieldResolver::new(config.fields.clone()));
    let request_fields = builder.request_fields();
    let fetched: Vec<_> = futures::stream::iter(releases)
        .map(|release| {
            let jql = fix_version_jql(&release.project_key, &release.version_name);
            let fields = &request_fields;
            async move {
                let result = client.search_issues(&jql, fields).await;
                (release, result)
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    // 3. One record per (issue, release).
    let mut records: Vec<IssueRecord> = Vec::new();
    for (release, result) in fetched {
        match result {
            Ok(issues) => {
                info!(
                    project = %release.project_key,
                    version = %release.version_name,
                    issues = issues.len(),
                    "fetched issues for release"
                );
                records.extend(issues.iter().map(|issue| builder.build(issue, &release)));
            }
            Err(e) => warn!(
                version = %release.version_name,
                error = %e,
                "failed to fetch issues for release"
            ),
        }
    }
    stats.records = records.len();
    if records.is_empty() {
        warn!("no issues found for the selected releases");
        stats.elapsed_secs = start.elapsed().as_secs_f64();
        return Ok(stats);
    }

    let columns = builder.columns();

    // 4. Issue table.
    let batch = report::records_to_batch(&columns, &records).context("building issue batch")?;
    let issues_path = output_path(ISSUES_PREFIX);
    write_batch(&issues_path, &batch, options.format).context("writing issue table")?;
    stats.issues_path = Some(issues_path);

    // 5. Keyword matches.
    if !options.keywords.is_empty() {
        if !config.search_columns.iter().any(|c| columns.contains(c)) {
            warn!(search_columns = ?config.search_columns, "no configured search column exists in the record layout");
        }

        let matches = filter_matches(&records, &options.keywords, &config.search_columns);
        stats.matches = matches.len();
        if matches.is_empty() {
            info!("no keyword matches found");
        } else {
            let batch = report::matches_to_batch(&columns, &matches)
                .context("building keyword match batch")?;
            let matches_path = output_path(MATCHES_PREFIX);
            write_batch(&matches_path, &batch, options.format)
                .context("writing keyword match table")?;
            stats.matches_path = Some(matches_path);
        }
    }

    stats.elapsed_secs = start.elapsed().as_secs_f64();
    info!(
        releases = stats.releases,
        records = stats.records,
        matches = stats.matches,
        "extraction complete"
    );
    Ok(stats)
}
