//! CLI output formatting utilities

use colored::Colorize;

use crate::auth::Claims;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print the identity and lifetime carried by a verified token
pub fn print_claims(claims: &Claims) {
    let user = &claims.user;

    println!("{}", "Token Details".bold().underline());
    println!();
    println!("  {} {}", "Id:".bold(), user.id);
    println!("  {} {}", "Email:".bold(), user.email);
    println!("  {} {}", "Name:".bold(), user.name);
    println!("  {} {}", "Role:".bold(), user.role.to_string().cyan());
    if let Some(roll_no) = &user.roll_no {
        println!("  {} {}", "Roll No:".bold(), roll_no);
    }
    if let Some(department) = &user.department {
        println!("  {} {}", "Department:".bold(), department);
    }

    println!("  {} {}", "Issuer:".bold(), claims.iss);
    println!("  {} {}", "Audience:".bold(), claims.aud);
    match claims.expires_at() {
        Some(expires) => println!(
            "  {} {}",
            "Expires:".bold(),
            expires.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("  {} {}", "Expires:".bold(), "unknown".red()),
    }
}
