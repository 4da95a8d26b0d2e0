use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;

pub fn init(verbose: bool) -> Result<()> {
    SimpleLogger::new()
        .with_level(level(verbose))
        .with_module_level("reqwest", LevelFilter::Warn)
        .with_module_level("hyper", LevelFilter::Warn)
        .init()?;

    Ok(())
}

fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
