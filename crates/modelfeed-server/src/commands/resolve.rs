use anyhow::Result;

use modelfeed::upstream::ModelsDevSource;
use modelfeed::OverrideSet;
use modelfeed_server::configuration::Settings;
use modelfeed_server::logging;

/// One-shot resolution: fetch, merge, seal, print. Useful for
/// inspecting what the next scheduled run would publish.
pub async fn run() -> Result<()> {
    logging::setup_logging()?;

    let settings = Settings::new()?;
    let source = ModelsDevSource::new(settings.upstream_url.clone())?;
    let overrides = match &settings.overrides_file {
        Some(path) => OverrideSet::from_file(path)?,
        None => OverrideSet::bundled()?.clone(),
    };

    let manifest = modelfeed::resolve_manifest(&source, &overrides).await?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
