//! Implementation of `atlasq init`.

use std::{fs, path::PathBuf, process::ExitCode};

use atlasq_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};

use crate::cli::{args::InitCommand, context::CommandContext};

/// Writes a commented-out `.atlasq.toml` template.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let (config_path, global) = match target(ctx, cmd.global) {
        Ok(target) => target,
        Err(code) => return code,
    };

    if config_path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = if global {
        global_template()
    } else {
        local_template()
    };
    if let Err(e) = fs::write(&config_path, template) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", config_path.display());
    println!("Uncomment the settings you want to change.");
    ExitCode::SUCCESS
}

/// Picks the file to write and whether it is the global one.
///
/// Running in the home directory always targets the global file.
fn target(ctx: &CommandContext, global: bool) -> Result<(PathBuf, bool), ExitCode> {
    let global_path = global_config_path();
    let in_home = global_path
        .as_deref()
        .and_then(|p| p.parent())
        .is_some_and(|home| home == ctx.cwd);

    if !(global || in_home) {
        return Ok((ctx.cwd.join(CONFIG_FILENAME), false));
    }

    global_path.map(|p| (p, true)).ok_or_else(|| {
        eprintln!("error: could not determine home directory");
        ExitCode::FAILURE
    })
}
