//! Package command implementation

use anyhow::{Context, Result};
use lastfm_titlecase_bundle::{PackagedArchive, Packager, PackagerConfig, Platform};

/// Command-line options, all optional.
#[derive(Debug, Default)]
pub struct Options {
    pub dir: Option<String>,
    pub out_dir: Option<String>,
    pub platforms: Vec<String>,
    pub config: Option<String>,
    pub verify: bool,
}

/// Run the package command.
pub fn run(options: Options) -> Result<()> {
    let config = build_config(&options)?;
    let packager = Packager::new(config).context("Failed to load packaging inputs")?;

    let manifest = packager.manifest();
    println!(
        "Packaging {} v{}",
        manifest.name().unwrap_or("extension"),
        manifest.version().unwrap_or("?")
    );

    let written: Vec<PackagedArchive> = packager.run().context("Packaging failed")?;
    for archive in &written {
        println!(
            "  {}: {} ({} entries)",
            archive.platform,
            archive.path.display(),
            archive.entries
        );
    }

    if options.verify {
        for archive in &written {
            packager
                .verify(archive)
                .with_context(|| format!("Verification failed: {}", archive.path.display()))?;
        }
        println!("Verified {} archive(s)", written.len());
    }

    println!("\n✓ Packaging complete");
    Ok(())
}

/// Resolve the packaging configuration from defaults, config file, and flags.
///
/// Flags win over the config file; the output directory falls back to the
/// source directory.
pub fn build_config(options: &Options) -> Result<PackagerConfig> {
    let source_dir = options.dir.clone().unwrap_or_else(|| ".".to_string());

    let mut config = PackagerConfig::default()
        .with_source_dir(&source_dir)
        .with_output_dir(&source_dir);

    if let Some(path) = &options.config {
        config = config
            .apply_toml_file(path)
            .with_context(|| format!("Failed to load config: {path}"))?;
    }

    if let Some(out_dir) = &options.out_dir {
        config = config.with_output_dir(out_dir);
    }

    if !options.platforms.is_empty() {
        let platforms = options
            .platforms
            .iter()
            .map(|name| {
                Platform::parse(name).with_context(|| {
                    format!("Unknown platform: {name} (expected chrome, edge, or firefox)")
                })
            })
            .collect::<Result<Vec<_>>>()?;
        config = config.with_platforms(platforms);
    }

    Ok(config)
}
