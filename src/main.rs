use clap::Parser;
use std::path::Path;
use ua_mixer::config::toml_config::TomlConfig;
use ua_mixer::core::registry::DEFAULT_POOL_NAMES;
use ua_mixer::core::{ConfigProvider, PoolSpec};
use ua_mixer::utils::error::MixerError;
use ua_mixer::utils::logger::{self, LogFormat};
use ua_mixer::utils::validation::Validate;
use ua_mixer::{CliConfig, LocalStorage, MixEngine, MixPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    let log_format = args.log_format.parse::<LogFormat>().unwrap_or_else(|e| {
        eprintln!("⚠️  {}, falling back to compact logs", e);
        LogFormat::Compact
    });
    logger::init_cli_logger(args.verbose, log_format);

    tracing::info!("Starting ua-mixer");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    let result = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}'", path);
                    report_failure(&e);
                    return Ok(());
                }
            };

            // 指令列給的路徑以目前目錄為基準
            let cwd = std::env::current_dir()?;
            let extra_pools: Vec<PoolSpec> = args
                .pools
                .iter()
                .map(|spec| PoolSpec {
                    name: spec.name.clone(),
                    sources: spec
                        .sources
                        .iter()
                        .map(|s| cwd.join(s).to_string_lossy().into_owned())
                        .collect(),
                })
                .collect();

            let output_path = args
                .output_path
                .as_ref()
                .map(|p| cwd.join(p).to_string_lossy().into_owned());

            config.apply_overrides(
                args.primary.as_deref(),
                output_path.as_deref(),
                args.formats.as_deref(),
                &extra_pools,
                args.bundle,
                args.seed_default_pools,
                args.start_cursor,
            );

            // 設定檔內的相對路徑以設定檔所在目錄為基準
            let base = Path::new(path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            run(config, LocalStorage::new(base), args.dry_run).await
        }
        None => run(args.clone(), LocalStorage::new("."), args.dry_run).await,
    };

    match result {
        Ok(Some(output_path)) => {
            tracing::info!("✅ Mix completed successfully!");
            println!("✅ Mix completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Ok(None) => {}
        Err(e) => report_failure(&e),
    }

    Ok(())
}

async fn run<C>(config: C, storage: LocalStorage, dry_run: bool) -> Result<Option<String>, MixerError>
where
    C: ConfigProvider + Validate + 'static,
{
    config.validate()?;
    tracing::info!("✅ Configuration validated");

    display_plan(&config);
    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual mixing will occur");
        return Ok(None);
    }

    let engine = MixEngine::new(MixPipeline::new(storage, config));
    engine.run().await.map(Some)
}

fn display_plan<C: ConfigProvider>(config: &C) {
    println!("📋 Mix plan");
    println!("   Primary pool: {}", config.primary_name());
    for spec in config.pools() {
        println!("   Pool {:<12} <- {}", spec.name, spec.sources.join(", "));
    }
    if config.seed_default_pools() {
        println!("   Seeded with: {}", DEFAULT_POOL_NAMES.join(", "));
    }
    println!("   Output: {} [{}]", config.output_path(), config.output_formats().join(", "));
    if config.bundle_enabled() {
        println!("   Bundle: enabled");
    }
}

fn report_failure(e: &MixerError) {
    tracing::error!(
        "❌ Mix failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = e.severity().exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
