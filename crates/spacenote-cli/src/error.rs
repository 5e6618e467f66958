use colored::Colorize;
use spacenote_core::ClientError;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let client_error = err.downcast_ref::<ClientError>();
    let msg = err.to_string().to_lowercase();

    if client_error.is_some_and(ClientError::is_session_expired) || msg.contains("not logged in") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Log in with:");
        eprintln!("  {} spacenote login", "$".dimmed());
    }

    if client_error.is_some_and(ClientError::is_network) || msg.contains("connection refused") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check that the SpaceNote backend is reachable, or point to it with:");
        eprintln!("  {} spacenote --api-url http://host:3000/api ...", "$".dimmed());
    }

    if let Some(ClientError::Validation(errors)) = client_error {
        for error in &errors.errors {
            eprintln!("  {} {}: {}", "-".dimmed(), error.field, error.message);
        }
    }

    if let Some(ClientError::NotFound(_)) = client_error
        && msg.contains("space")
    {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List available spaces with:");
        eprintln!("  {} spacenote space list --refresh", "$".dimmed());
    }

    std::process::exit(1);
}
