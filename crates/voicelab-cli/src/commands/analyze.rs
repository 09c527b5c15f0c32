use std::path::Path;

use anyhow::{Context, Result};

use voicelab_core::confidence;
use voicelab_core::prediction::ModelId;

use super::context;

pub async fn run(file: &Path, model: ModelId, ensemble: bool, report: bool) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read audio file {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sample.wav".to_string());

    let auth = context::auth_controller().await?;
    let diagnostic = context::diagnostic_controller(auth);

    diagnostic.select_file(file_name, bytes).await;
    println!("🔬 Analyzing with {}...", if ensemble { "ensemble" } else { model.display_name() });

    let prediction = match diagnostic.analyze(model, ensemble).await {
        Ok(prediction) => prediction,
        Err(err) => {
            if let Some(message) = diagnostic.last_error().await {
                anyhow::bail!(message);
            }
            return Err(err.into());
        }
    };

    let band = confidence::band(prediction.probability);
    println!("Result:      {}", prediction.class_name);
    println!(
        "Confidence:  {:.1}% ({})",
        confidence::display_percent(prediction.probability),
        band.label()
    );
    println!(
        "Model:       {}",
        prediction.attributed_model_name(ensemble)
    );
    if let Some(version) = &prediction.version {
        println!("Version:     {version}");
    }

    if report {
        println!("\n📋 Generating AI caregiver report...");
        let text = diagnostic.generate_report().await?;
        println!("{text}");
    }

    Ok(())
}
