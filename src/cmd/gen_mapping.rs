use clap::Args;
use rimebench::config::WorkDirs;
use rimebench::error::RbResult;
use rimebench::mapping;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenMappingArgs {
    /// Dictionary directory to derive from; defaults to the schema directory.
    #[arg(long)]
    pub dict_dir: Option<String>,

    /// Truncate derived codes to this length (0 = unconstrained, 1 rejected).
    #[arg(long, default_value_t = 0)]
    pub code_len: usize,
}

pub fn run(args: GenMappingArgs, data_root: &str, schema: &str) -> RbResult<()> {
    let dirs = WorkDirs::new(data_root);
    let dict_dir = args.dict_dir.as_deref().unwrap_or(schema);

    info!("🧮 Deriving mapping tables from {dict_dir}");
    let (table, polyphones) = mapping::build_derived(dict_dir, args.code_len)?;
    table.write_to(dirs.mapping_file())?;
    polyphones.write_to(dirs.mapping_sup_file())?;

    info!(
        "✅ Wrote {} mappings to {:?} and {} polyphones to {:?}",
        table.len(),
        dirs.mapping_file(),
        polyphones.len(),
        dirs.mapping_sup_file()
    );
    Ok(())
}
