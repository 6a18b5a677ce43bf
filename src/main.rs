use anyhow::{Context, Result};
use env_logger::Env;
use std::process::ExitCode;
use webdist::{Config, Esbuild};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = Config::parse();
    match build(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn build(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let paths = config.paths();
    let bundler = Esbuild::new(&config.esbuild);
    let report = webdist::run(&paths, &bundler).context("Build failed")?;

    let index = paths.production_document();
    println!("Build succeeded! Open {}", index.display());
    for path in &report.written {
        println!("  {}", path.display());
    }
    println!("Copied {} static files", report.copied);

    println!("\nFurther optimizations:");
    for (i, hint) in webdist::follow_up_suggestions(&paths.output)
        .iter()
        .enumerate()
    {
        println!("{}. {}", i + 1, hint);
    }

    if config.open {
        open::that(&index)
            .with_context(|| format!("Failed to open {}", index.display()))?;
    }

    Ok(())
}
