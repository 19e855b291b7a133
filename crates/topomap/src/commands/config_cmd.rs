//! Config subcommand handlers.

use std::path::PathBuf;

use topomap_config::{Config, ProjectProfile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output;

fn target_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(topomap_config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show: resolved file + env layers ────────────────────────
        ConfigCommand::Show => {
            let cfg = load_config(global)?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            let out = output::render(format, &cfg, |c| {
                toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unrenderable config: {e}"))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Init: write a fresh file ────────────────────────────────
        ConfigCommand::Init {
            force,
            project,
            design,
            discovery,
            profiles,
        } => {
            let path = target_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if let Some(name) = project {
                let design = design.ok_or_else(|| CliError::MissingInput {
                    what: format!("design file for project '{name}'"),
                    flag: "design".into(),
                })?;
                cfg.projects.insert(
                    name.clone(),
                    ProjectProfile {
                        design,
                        discovery,
                        profiles,
                    },
                );
                cfg.default_project = Some(name);
            }

            topomap_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
