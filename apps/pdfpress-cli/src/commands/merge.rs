use super::print_json;
use crate::config::{Config, EncodingName, MergeConfig};
use anyhow::Context;
use clap::Args;
use pdfpress_core::assemble::{default_output_path, is_supported};
use pdfpress_core::{write_a4_pdf, AssembleOptions, MergeReport};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Images and PDFs, in page order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output settings shared by `merge` and `project run`
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Output file (default: <output_dir>/<output_name> from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resolution images are resampled to
    #[arg(long)]
    pub dpi: Option<u32>,

    /// How images are stored
    #[arg(long, value_enum)]
    pub encoding: Option<EncodingName>,

    /// JPEG quality, 1-100
    #[arg(long)]
    pub quality: Option<u8>,

    /// Fail on the first unreadable input instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    fn merge_config(&self, config: &Config) -> MergeConfig {
        let mut merge = config.merge.clone();
        if let Some(dpi) = self.dpi {
            merge.dpi = dpi;
        }
        if let Some(encoding) = self.encoding {
            merge.image_encoding = encoding;
        }
        if let Some(quality) = self.quality {
            merge.jpeg_quality = quality;
        }
        merge.strict |= self.strict;
        merge
    }

    fn output_path(&self, merge: &MergeConfig) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&merge.resolved_output_dir(), &merge.output_name))
    }
}

pub fn run(args: MergeArgs, config: &Config) -> anyhow::Result<()> {
    write_merged(&args.inputs, &args.output, config)
}

/// Assemble `inputs` and report the result
pub fn write_merged<P: AsRef<Path>>(
    inputs: &[P],
    args: &OutputArgs,
    config: &Config,
) -> anyhow::Result<()> {
    let merge = args.merge_config(config);
    let options = AssembleOptions {
        image: merge.image_options()?,
        strict: merge.strict,
    };
    let output = args.output_path(&merge);

    for input in inputs {
        let input = input.as_ref();
        if !is_supported(input) {
            warn!(path = %input.display(), "unrecognised extension, trying as an image");
        }
    }

    let report = write_a4_pdf(inputs, &output, &options)
        .with_context(|| format!("Failed to build {}", output.display()))?;

    if args.json {
        print_json(&report)
    } else {
        print_summary(&report);
        Ok(())
    }
}

fn print_summary(report: &MergeReport) {
    if let Some(output) = &report.output {
        println!(
            "Wrote {} ({} pages from {} inputs, {} bytes, {} ms)",
            output.display(),
            report.page_count,
            report.sources.len(),
            report.output_size_bytes,
            report.processing_time_ms
        );
    }
    if report.pages_not_normalized > 0 {
        println!(
            "  {} page(s) had no usable page box and were kept at their size",
            report.pages_not_normalized
        );
    }
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pdfpress_core::ImageEncoding;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: MergeArgs,
    }

    #[test]
    fn test_requires_inputs() {
        assert!(Wrapper::try_parse_from(["merge"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let parsed = Wrapper::try_parse_from([
            "merge",
            "a.png",
            "b.pdf",
            "--dpi",
            "150",
            "--encoding",
            "flate",
            "--strict",
        ])
        .unwrap()
        .args;
        assert_eq!(parsed.inputs.len(), 2);

        let merge = parsed.output.merge_config(&Config::default());
        assert_eq!(merge.dpi, 150);
        assert!(merge.strict);
        assert_eq!(merge.image_options().unwrap().encoding, ImageEncoding::Flate);
    }

    #[test]
    fn test_default_output_uses_config() {
        let mut config = Config::default();
        config.merge.output_dir = Some(PathBuf::from("/srv/out"));
        config.merge.output_name = "bundle".into();

        let args = OutputArgs::default();
        let merge = args.merge_config(&config);
        assert_eq!(args.output_path(&merge), PathBuf::from("/srv/out/bundle.pdf"));
    }

    #[test]
    fn test_write_merged_reports_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = OutputArgs {
            output: Some(dir.path().join("out.pdf")),
            ..Default::default()
        };
        let err = write_merged(&[dir.path().join("missing.png")], &args, &Config::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("none could be read"));
        assert!(!dir.path().join("out.pdf").exists());
    }
}
