use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use lipidconv::settings::ConversionSettings;
use lipidconv::translate::{MzXmlPolarityProbe, TranslationJob, TranslationRequest};

/// Report whether an mzXML file contains both polarities
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut request = TranslationRequest::from_settings(&file, &ConversionSettings::default());
    if let Some(ext) = file.extension() {
        request.format = ext.to_string_lossy().into_owned();
    }

    let outcome = TranslationJob::new(request, Arc::new(MzXmlPolarityProbe))
        .run()
        .with_context(|| format!("Failed to probe {}", file.display()))?;

    println!(
        "{}: {}",
        file.display(),
        if outcome.polarity_switched {
            "polarity switching"
        } else {
            "single polarity"
        }
    );
    Ok(())
}
