use anyhow::Result;
use sketchlink_core::config::RootConfig;
use sketchlink_infrastructure::ConfigService;

pub fn show(service: &ConfigService, config: &RootConfig) -> Result<()> {
    let source = if service.path().exists() {
        service.path().display().to_string()
    } else {
        format!("{} (not found, defaults)", service.path().display())
    };

    println!("# {}", source);
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
