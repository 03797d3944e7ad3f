//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes an
//! `orchestrator.toml` settings file, either from defaults or through an
//! interactive wizard.
//!
//! 此模块实现了 `init` 命令，用于写出 `orchestrator.toml` 设置文件，
//! 可以使用默认值，也可以通过交互式向导生成。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: Step-by-step prompts for the paths and commands
//! - **Overwrite Protection**: Confirmation prompts before overwriting existing settings
//!
//! - **交互式向导**: 逐步提示路径和命令
//! - **覆盖保护**: 覆盖现有设置前的确认提示

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::{Path, PathBuf};

use crate::core::config::OrchestratorConfig;
use crate::infra::{fs, t};

/// Runs the `init` command.
///
/// In non-interactive mode the default settings are written, and an existing
/// file is only replaced when `force` is set. Otherwise the user is prompted
/// for each path and command.
///
/// 运行 `init` 命令。非交互模式下写入默认设置，仅在设置了 `force` 时才替换已有文件；
/// 否则会逐项提示用户输入路径和命令。
pub fn run_init_wizard(
    language: &str,
    output: &Path,
    non_interactive: bool,
    force: bool,
) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init.wizard_welcome", locale = language).cyan().bold());
        println!("{}", t!("init.wizard_description", locale = language));
    }

    if output.exists() && !force {
        if non_interactive {
            println!(
                "{}",
                t!("init.file_exists", locale = language, path = output.display()).red()
            );
            println!("{}", t!("init.use_force", locale = language).yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", locale = language, path = output.display()))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = language).yellow());
            return Ok(());
        }
    }

    let mut config = OrchestratorConfig {
        language: Some(language.to_string()),
        ..OrchestratorConfig::default()
    };
    if !non_interactive {
        prompt_for_settings(&theme, language, &mut config)?;
    }

    let toml_string = toml::to_string_pretty(&config)
        .context(t!("init.serialize_failed", locale = language).to_string())?;
    fs::write_creating_parents(output, &toml_string)
        .with_context(|| t!("init.write_failed", locale = language, path = output.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", locale = language, path = output.display()).bold()
    );
    println!("{}", t!("init.next_steps", locale = language));
    Ok(())
}

/// Prompts for each user-facing setting, pre-filled with the current value.
fn prompt_for_settings(
    theme: &ColorfulTheme,
    language: &str,
    config: &mut OrchestratorConfig,
) -> Result<()> {
    let config_set: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_config_set", locale = language))
        .default(config.config_set_path.display().to_string())
        .interact_text()?;
    config.config_set_path = PathBuf::from(config_set);

    config.test_script = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_test_script", locale = language))
        .default(config.test_script.clone())
        .interact_text()?;

    config.apply_command = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_apply_command", locale = language))
        .default(config.apply_command.clone())
        .interact_text()?;

    let artifact: String = Input::with_theme(theme)
        .with_prompt(t!("init.prompt_working_artifact", locale = language))
        .default(config.working_artifact_path.display().to_string())
        .interact_text()?;
    config.working_artifact_path = PathBuf::from(artifact);

    config.post_steps_on_empty = Confirm::with_theme(theme)
        .with_prompt(t!("init.prompt_post_steps_on_empty", locale = language))
        .default(config.post_steps_on_empty)
        .interact()?;

    Ok(())
}
