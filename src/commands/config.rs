use anyhow::Result;
use sdkpack::Config;

pub fn run(action: &crate::ConfigAction) -> Result<()> {
    use crate::ConfigAction;

    match action {
        ConfigAction::Show => show_config(),
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
            Ok(())
        }
        ConfigAction::Set { key, value } => set_config(key, value),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::default_path()?;

    println!("# {}", config_path.display());
    if !config_path.exists() {
        println!("# (file does not exist; showing defaults)");
    }
    println!();
    print!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    // Read the file itself so environment overrides are not persisted
    let path = Config::default_path()?;
    let mut config = Config::load_from(&path)?;

    config.set(key, value)?;
    config.save_to(&path)?;

    if value.is_empty() {
        println!("✓ {} = <cleared>", key);
    } else {
        println!("✓ {} = \"{}\"", key, value);
    }
    println!("Configuration saved to {}", path.display());

    Ok(())
}
