//! Walk the source tree and turn every new texture sighting into a package
//!
//! Two passes share one run context: loose files first, grouped per
//! directory, then every `.zip`/`.rar` archive. Package numbers continue
//! across both passes.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::archive::ArchiveKind;
use crate::cli::ExtractArgs;
use crate::config::{Config, Settings};
use crate::extract::extract_and_dedup;
use crate::hash::ContentHash;
use crate::logging;
use crate::package::{BuiltPackage, Packager, Texture};
use crate::utils::remove_dir_if_empty;

#[derive(Debug, Default)]
pub struct RunReport {
    pub packages: Vec<BuiltPackage>,
    pub loose_textures: usize,
    pub archives_scanned: usize,
    pub duplicates: usize,
}

/// State shared by both passes of one run.
struct RunContext {
    seen: HashSet<ContentHash>,
    next_number: u64,
    report: RunReport,
}

impl RunContext {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            next_number: 1,
            report: RunReport::default(),
        }
    }

    fn record(&mut self, built: BuiltPackage) {
        self.next_number += 1;
        self.report.packages.push(built);
    }
}

pub fn run(args: ExtractArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let _log_guard = logging::init(&config.log_file(&args), &config.logging.level)?;
    let settings = config.settings(&args);

    println!(
        "{}",
        format!("[Extract] {}", settings.source.display()).green()
    );
    debug!("Run started");

    let report = run_pipeline(&settings);

    debug!("Run finished");
    for package in &report.packages {
        debug!(
            "Package {} written to {}",
            package.number,
            package.zip_path.display()
        );
    }
    let collected = report
        .packages
        .iter()
        .filter(|p| p.collection_copy.is_some())
        .count();
    let summary = format!(
        "[OK] {} package(s) in {} ({} duplicate(s) skipped)",
        report.packages.len(),
        settings.target.display(),
        report.duplicates
    );
    if report.packages.is_empty() {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.green());
    }
    if let Some(dir) = &settings.collection {
        println!("  Copied {} zip(s) to {}", collected, dir.display());
    }

    Ok(())
}

/// Run both passes. Never fails: every error ends up in the log and the
/// report holds whatever was produced before it.
pub fn run_pipeline(settings: &Settings) -> RunReport {
    let mut ctx = RunContext::new();

    if let Err(e) = find_and_package(settings, &mut ctx) {
        error!(
            "An error occurred while processing {}: {:#}",
            settings.source.display(),
            e
        );
    }

    ctx.report
}

fn find_and_package(settings: &Settings, ctx: &mut RunContext) -> Result<()> {
    if !settings.source.is_dir() {
        error!("Source directory does not exist: {}", settings.source.display());
        return Ok(());
    }

    if !settings.target.exists() {
        debug!(
            "Target directory does not exist, creating: {}",
            settings.target.display()
        );
    }
    fs::create_dir_all(&settings.target)
        .with_context(|| format!("Failed to create {}", settings.target.display()))?;

    let packager = Packager::new(
        &settings.target,
        &settings.premade,
        settings.package_prefix.as_str(),
        settings.collection.clone(),
    );

    package_loose_files(settings, &packager, ctx)?;

    if let Err(e) = package_archives(settings, &packager, ctx) {
        error!("An error occurred while processing archives: {:#}", e);
    }

    info!("Processing finished.");
    info!(
        "Loose files found and copied: {}, archives scanned: {}, duplicates skipped: {}, packages: {}",
        ctx.report.loose_textures,
        ctx.report.archives_scanned,
        ctx.report.duplicates,
        ctx.report.packages.len()
    );

    Ok(())
}

/// Files of a directory before its subdirectories, each group by name, so a
/// directory's files arrive contiguously and numbering is stable.
fn source_walker(source: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(source)
        .sort_by(|a, b| {
            match (a.file_type().is_dir(), b.file_type().is_dir()) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => a.file_name().cmp(b.file_name()),
            }
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
}

fn package_loose_files(
    settings: &Settings,
    packager: &Packager,
    ctx: &mut RunContext,
) -> Result<()> {
    let mut batch: Vec<Texture> = Vec::new();

    for entry in source_walker(&settings.source) {
        if entry.file_type().is_dir() {
            flush_loose_batch(packager, ctx, &mut batch)?;
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !settings.target_names.iter().any(|t| *t == name) || !entry.path().is_file() {
            continue;
        }

        let hash = ContentHash::of_file(entry.path())?;
        if !ctx.seen.insert(hash) {
            info!("Image {} skipped (already copied, {})", name, hash);
            ctx.report.duplicates += 1;
            continue;
        }

        let parent = entry.path().parent().unwrap_or(Path::new("."));
        info!("File {} found in {}", name, parent.display());
        batch.push(Texture {
            name: name.into_owned(),
            source: entry.path().to_path_buf(),
        });
    }

    flush_loose_batch(packager, ctx, &mut batch)
}

fn flush_loose_batch(
    packager: &Packager,
    ctx: &mut RunContext,
    batch: &mut Vec<Texture>,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let built = packager.build(ctx.next_number, batch)?;
    ctx.report.loose_textures += batch.len();
    ctx.record(built);
    batch.clear();

    Ok(())
}

fn package_archives(
    settings: &Settings,
    packager: &Packager,
    ctx: &mut RunContext,
) -> Result<()> {
    let archives: Vec<(PathBuf, ArchiveKind)> = source_walker(&settings.source)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            ArchiveKind::from_path(entry.path()).map(|kind| (entry.into_path(), kind))
        })
        .collect();

    let pb = ProgressBar::new(archives.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    for (path, kind) in archives {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        package_archive(settings, packager, ctx, &path, kind)?;
        pb.inc(1);
    }

    pb.finish_and_clear();

    Ok(())
}

fn package_archive(
    settings: &Settings,
    packager: &Packager,
    ctx: &mut RunContext,
    path: &Path,
    kind: ArchiveKind,
) -> Result<()> {
    debug!("Opening {} archive: {}", kind, path.display());

    let mut archive = kind
        .open(path)
        .with_context(|| format!("Failed to open {} archive {}", kind, path.display()))?;
    ctx.report.archives_scanned += 1;

    let number = ctx.next_number;
    let extraction = extract_and_dedup(
        archive.as_mut(),
        &settings.target_names,
        &settings.target,
        number,
        &mut ctx.seen,
    )
    .with_context(|| format!("Failed to extract from {}", path.display()))?;
    ctx.report.duplicates += extraction.duplicates;

    let built = if extraction.textures.is_empty() {
        None
    } else {
        let built = packager.build(number, &extraction.textures);
        for texture in &extraction.textures {
            if let Err(e) = fs::remove_file(&texture.source) {
                warn!("Failed to remove {}: {}", texture.source.display(), e);
            }
        }
        Some(built)
    };

    remove_dir_if_empty(&settings.target.join(number.to_string()));

    if let Some(built) = built {
        ctx.record(built?);
    }

    Ok(())
}
