use crate::reports;
use clap::Args;
use rayon::prelude::*;
use rimebench::charset::Charset;
use rimebench::codegen::{CodeStream, Encoder, PolyphoneMatch, SESSION_END};
use rimebench::config::{BenchConfig, SchemeMode, WorkDirs, SUPPLEMENTARY_FILE_NAME};
use rimebench::driver::SimulationDriver;
use rimebench::engine::{CommitLine, RimeConsole, COMMIT_PREFIX};
use rimebench::ergonomics::{KeyboardModel, ModelClassifiers};
use rimebench::error::RbResult;
use rimebench::mapping;
use rimebench::report::{self, ReportWriter};
use rimebench::segment::segment;
use rimebench::stats::{self, AccuracyStats};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: BenchConfig,

    /// Dictionary directory for derived-mode table generation; defaults to
    /// the schema directory.
    #[arg(long)]
    pub dict_dir: Option<String>,
}

struct PreparedArticle {
    name: String,
    ready_lines: Vec<String>,
    stream: CodeStream,
    audit: Vec<PolyphoneMatch>,
}

pub fn run(args: RunArgs, data_root: &str, schema: &str, engine_bin: &str) -> RbResult<()> {
    let started = Instant::now();
    args.config.validate()?;

    let dirs = WorkDirs::new(data_root);
    let files = dirs.article_files()?;
    dirs.bootstrap()?;

    info!("📚 Loading charset from {:?}", dirs.charsets());
    let charset = Charset::load_dir(dirs.charsets())?;

    let (mapping, polyphones) = match args.config.mode {
        SchemeMode::DirectCode => (mapping::load_direct(dirs.mapping_file())?, None),
        SchemeMode::Polyphone => {
            let dict_dir = args.dict_dir.as_deref().unwrap_or(schema);
            let (table, poly) = mapping::build_derived(dict_dir, args.config.code_len)?;
            table.write_to(dirs.mapping_file())?;
            poly.write_to(dirs.mapping_sup_file())?;
            (table, Some(poly))
        }
    };

    let engine = RimeConsole::new(engine_bin, schema);
    engine.deploy()?;

    // Segmentation and encoding share only read-only tables, so articles are
    // prepared in parallel; every engine pass below stays serialized.
    info!("✂️  Preparing {} articles", files.len());
    let prepared: RbResult<Vec<PreparedArticle>> = files
        .par_iter()
        .map(|path| prepare_article(path, &dirs, &charset, &mapping, polyphones.as_ref(), &args.config))
        .collect();
    let prepared = prepared?;

    let mut driver = SimulationDriver::new(&engine);
    let mut commit_logs: Vec<Vec<CommitLine>> = Vec::with_capacity(prepared.len());
    for p in &prepared {
        info!("⌨️  Simulating {}", p.name);
        let commits = driver.run_first_pass(&p.name, &p.ready_lines, &p.stream)?;
        write_commit_artifact(&dirs, &p.name, &commits)?;
        commit_logs.push(commits);
    }

    if !driver.batch().is_empty() {
        info!("🔁 Retrying {} corrupted lines", driver.batch().len());
        write_supplementary_artifacts(&dirs, driver.batch())?;
    }
    let sup = driver.run_final_pass()?;

    let model = match &args.config.keyboard {
        Some(path) => KeyboardModel::load_from_file(path)?,
        None => KeyboardModel::standard(),
    };
    let classifiers = ModelClassifiers::new(&model);

    let writer = ReportWriter::new(dirs.stats_file(), args.config.ergonomics);
    let mut total = AccuracyStats::default();
    let mut rows = Vec::new();
    let mut all_matches = Vec::new();

    for (p, commits) in prepared.iter().zip(&commit_logs) {
        let (mut file_stats, unmatched) = stats::score(&p.name, &p.ready_lines, commits, &sup)?;
        stats::accumulate_code_lengths(&mut file_stats, &p.ready_lines, &p.stream);
        if args.config.ergonomics {
            stats::accumulate_keystrokes(&mut file_stats, &p.stream, &classifiers);
        }
        report::write_unmatched(dirs.unmatched().join(&p.name), &unmatched)?;
        writer.append_section(Some(p.name.as_str()), &file_stats)?;
        total.absorb(&file_stats);
        rows.push((p.name.clone(), file_stats));
        all_matches.extend(p.audit.iter().cloned());
    }
    writer.append_section(None, &total)?;
    report::write_audit(dirs.audit_file(), &all_matches)?;

    reports::print_summary(&rows, &total, args.config.ergonomics);
    info!(
        "✅ Statistics written to {:?} ({:.2}s)",
        dirs.stats_file(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn prepare_article(
    path: &Path,
    dirs: &WorkDirs,
    charset: &Charset,
    mapping: &mapping::MappingTable,
    polyphones: Option<&mapping::PolyphoneTable>,
    config: &BenchConfig,
) -> RbResult<PreparedArticle> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("article.txt")
        .to_string();

    let raw = fs::read_to_string(path)?;
    let article = segment(&raw, charset, mapping, config.min_line_len);

    let encoder = match polyphones {
        Some(poly) => Encoder::with_polyphones(mapping, poly),
        None => Encoder::new(mapping),
    };
    let mut audit = Vec::new();
    let stream = encoder.encode_article(&name, &article.ready_lines, &mut audit)?;

    fs::write(dirs.articles_full().join(&name), article.full_text())?;
    fs::write(dirs.articles_ready().join(&name), article.ready_text())?;
    fs::write(dirs.input().join(&name), stream.to_artifact())?;

    Ok(PreparedArticle {
        name,
        ready_lines: article.ready_lines,
        stream,
        audit,
    })
}

fn write_commit_artifact(dirs: &WorkDirs, name: &str, commits: &[CommitLine]) -> RbResult<()> {
    let mut text = String::new();
    for c in commits {
        text.push_str(COMMIT_PREFIX);
        text.push_str(&c.text);
        text.push('\n');
    }
    fs::write(dirs.output().join(name), text)?;
    Ok(())
}

fn write_supplementary_artifacts(
    dirs: &WorkDirs,
    batch: &rimebench::driver::SupplementaryBatch,
) -> RbResult<()> {
    let mut ready = batch.ready_lines.join("\n");
    if !ready.is_empty() {
        ready.push('\n');
    }
    fs::write(dirs.articles_ready().join(SUPPLEMENTARY_FILE_NAME), ready)?;

    let mut input = String::new();
    for line in &batch.code_lines {
        input.push_str(line);
        input.push('\n');
    }
    input.push('\n');
    input.push_str(SESSION_END);
    input.push('\n');
    fs::write(dirs.input().join(SUPPLEMENTARY_FILE_NAME), input)?;
    Ok(())
}
