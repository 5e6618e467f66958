use anyhow::{Context, Result, bail};
use serde_json::json;
use spacenote_core::{AppContext, Route, TemplateKind};

use crate::cli::{TemplateCommands, TemplateTarget};
use crate::commands::utils::{require_auth, success};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: TemplateCommands, format: OutputFormat) -> Result<()> {
    match command {
        TemplateCommands::Show { space, kind } => show_template(ctx, &space, kind, format).await,
        TemplateCommands::Set {
            space,
            kind,
            file,
            template,
        } => {
            let input = match (file, template) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {path}"))?,
                (None, Some(text)) => text,
                (None, None) => bail!("Provide the template with --file or --template"),
            };
            save_template(ctx, &space, kind, &input, format).await
        }
        TemplateCommands::Clear { space, kind } => {
            save_template(ctx, &space, kind, "", format).await
        }
        TemplateCommands::Validate { file } => validate_template(ctx, &file, format),
    }
}

fn template_kind(target: TemplateTarget) -> TemplateKind {
    match target {
        TemplateTarget::Detail => TemplateKind::NoteDetail,
        TemplateTarget::List => TemplateKind::NoteList,
    }
}

async fn show_template(
    ctx: &AppContext,
    space_id: &str,
    target: TemplateTarget,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::SpaceTemplates { space_id: space_id.to_string() })?;
    let space = ctx.space(space_id).await?;
    let template = match target {
        TemplateTarget::Detail => space.note_detail_template,
        TemplateTarget::List => space.note_list_template,
    };

    if format.is_json() {
        return print_json(&json!({ "space_id": space_id, "template": template }));
    }

    match template {
        Some(template) => println!("{template}"),
        None => println!("No template set; notes use the default view."),
    }
    Ok(())
}

async fn save_template(
    ctx: &AppContext,
    space_id: &str,
    target: TemplateTarget,
    input: &str,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::SpaceTemplates { space_id: space_id.to_string() })?;
    let saved = ctx
        .set_template(space_id, template_kind(target), input)
        .await?;

    if format.is_json() {
        return print_json(&json!({ "space_id": space_id, "template": saved }));
    }

    if saved.is_some() {
        success(format!("Template saved for {space_id}"));
    } else {
        success(format!("Template cleared for {space_id}"));
    }
    Ok(())
}

fn validate_template(ctx: &AppContext, file: &str, format: OutputFormat) -> Result<()> {
    let input = std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;
    let result = ctx.templates.validate(&input);

    if format.is_json() {
        return print_json(&result);
    }

    match result.error {
        Some(error) if !result.valid => bail!("Invalid template: {error}"),
        _ => success("Template is valid"),
    }
    Ok(())
}
