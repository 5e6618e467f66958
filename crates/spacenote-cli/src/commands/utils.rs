use anyhow::{Result, bail};
use colored::Colorize;
use spacenote_core::{AppContext, Route};
use std::io::{BufRead, Write};

/// Pass the route through the auth guard. Fails when it bounces to login.
pub fn require_auth(ctx: &AppContext, route: Route) -> Result<Route> {
    let landed = ctx.navigate(route.clone());
    if landed == Route::Login && route != Route::Login {
        bail!("Not logged in (redirected from {} to {})", route, landed);
    }
    Ok(landed)
}

pub fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn prompt_secret(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(label)?)
}

/// Split `name=value` assignments. The value may contain `=`.
pub fn parse_assignments(items: &[String]) -> Result<Vec<(String, String)>> {
    items
        .iter()
        .map(|item| match item.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => bail!("Invalid field assignment '{}', expected name=value", item),
        })
        .collect()
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

pub fn preview_text(input: &str, max_len: usize) -> String {
    if input.chars().count() <= max_len {
        return input.to_string();
    }

    let mut preview = input.chars().take(max_len).collect::<String>();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments() {
        let parsed = parse_assignments(&["title=Buy milk".into(), "expr=a=b".into()]).unwrap();
        assert_eq!(parsed[0], ("title".to_string(), "Buy milk".to_string()));
        assert_eq!(parsed[1], ("expr".to_string(), "a=b".to_string()));
        assert!(parse_assignments(&["novalue".into()]).is_err());
        assert!(parse_assignments(&["=x".into()]).is_err());
    }

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("short", 10), "short");
        assert_eq!(preview_text("abcdef", 3), "abc…");
    }
}
