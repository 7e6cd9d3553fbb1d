use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lipidconv::job::{ConversionJob, SplitMode};
use lipidconv::preset::ConverterPreset;
use lipidconv::runner::SystemProcessRunner;
use lipidconv::settings::ConversionSettings;
use lipidconv::template::{CommandTemplate, SlotRole};
use lipidconv::translate::{MzXmlPolarityProbe, TranslationJob, TranslationRequest};

use super::config::Config;
use super::summary::{print_summary, Summary};
use super::ConvertArgs;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Convert one acquisition through the multi-level pipeline
pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.source.exists() {
        anyhow::bail!("Source does not exist: {}", args.source.display());
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = apply_overrides(config.settings, &args)?;

    let preset = match (args.preset, config.job.preset.as_deref()) {
        (Some(arg), _) => ConverterPreset::from(arg),
        (None, Some(name)) => name.parse().map_err(anyhow::Error::msg)?,
        (None, None) => ConverterPreset::default(),
    };
    let program = args
        .program
        .clone()
        .or(config.job.program)
        .unwrap_or_else(|| preset.default_program().to_string());
    let split = args
        .split
        .map(SplitMode::from)
        .or(config.job.split)
        .unwrap_or_else(|| preset.split_mode());

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.source.with_extension(settings.extension()));

    let template = match config.job.command {
        Some(tokens) => template_from_command(&tokens, preset, &args.source, &output)?,
        None => preset.template(&program, &args.source, &output),
    };

    info!("lipidconv - multi-level conversion");
    info!("==================================");
    info!("Source: {}", args.source.display());
    info!("Output: {}", output.display());
    info!("Preset: {} ({})", preset, program);
    info!("Split:  {}", split);
    info!("Command: {}", template);

    let mut job = ConversionJob::new(&args.source, &output, template).with_split(split);
    if let Some(dir) = args.marker_dir.clone().or(config.job.marker_dir) {
        job = job.with_marker_dir(dir);
    }

    let settings = Arc::new(settings);
    let handle = job
        .spawn(Arc::new(SystemProcessRunner::new()), Arc::clone(&settings))
        .context("Failed to start conversion job")?;

    let mut last_status = String::new();
    while !handle.wait_timeout(POLL_INTERVAL) {
        let status = handle.status().to_string();
        if status != last_status {
            info!("Job {}: {}", handle.id(), status);
            last_status = status;
        }
    }

    let outcome = handle
        .wait()
        .map_err(|e| anyhow::anyhow!("Conversion of {} failed: {}", args.source.display(), e))?;

    let polarity_switched = if args.probe {
        let request = TranslationRequest::from_settings(&outcome.output, &settings);
        let probe = TranslationJob::new(request, Arc::new(MzXmlPolarityProbe))
            .run()
            .context("Polarity probe failed")?;
        Some(probe.polarity_switched)
    } else {
        None
    };

    print_summary(
        &Summary {
            outcome,
            polarity_switched,
        },
        args.json,
    )
}

fn apply_overrides(mut settings: ConversionSettings, args: &ConvertArgs) -> Result<ConversionSettings> {
    if args.no_merge {
        settings.merge_multiple_files = false;
    }
    if args.skip_last {
        settings.skip_last_level = true;
    }
    if args.trust_files {
        settings.check_exit_status = false;
    }
    if let Some(strategy) = args.strategy {
        settings.merge_strategy = strategy.into();
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Build a template from an explicit positional command and point its
/// source and output slots at this job.
fn template_from_command(
    tokens: &[String],
    preset: ConverterPreset,
    source: &Path,
    output: &Path,
) -> Result<CommandTemplate> {
    let mut template = CommandTemplate::from_tokens(tokens, &preset.layout())
        .context("Command does not match the preset layout")?;

    template.set(SlotRole::Source, source.to_string_lossy())?;
    if template.has(SlotRole::OutputPath) {
        template.set(SlotRole::OutputPath, output.to_string_lossy())?;
    }
    if template.has(SlotRole::WorkingDir) {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        template.set(SlotRole::WorkingDir, dir.to_string_lossy())?;
    }
    Ok(template)
}
