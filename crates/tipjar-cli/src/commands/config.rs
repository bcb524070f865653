use anyhow::{Result, bail};
use tipjar_core::config::RootConfig;
use tipjar_infrastructure::ConfigService;

pub fn show(service: &ConfigService) -> Result<()> {
    let config = service.load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn path(service: &ConfigService) {
    println!("{}", service.path().display());
}

pub fn init(service: &ConfigService, force: bool) -> Result<()> {
    if service.path().exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            service.path().display()
        );
    }
    service.save(&RootConfig::default())?;
    println!("Wrote default configuration to {}", service.path().display());
    Ok(())
}
