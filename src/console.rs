//! Pretty terminal output with colors and badges.

use colored::Colorize;

// === Startup ===

fn banner_title() -> String {
    format!("🔑 jwt-gate v{}", env!("CARGO_PKG_VERSION"))
}

pub fn print_banner() {
    println!();
    println!("{}", "╔═══════════════════════════════════════════════════════════╗".cyan());
    println!("{}", "║                                                           ║".cyan());
    println!("║     {:<54}║", banner_title().bold().white());
    println!("║     {}            ║", "HS256 bearer tokens with role gates".dimmed());
    println!("{}", "║                                                           ║".cyan());
    println!("{}", "╚═══════════════════════════════════════════════════════════╝".cyan());
    println!();
}

pub fn print_startup(addr: &str, issuer: &str, audience: &str, lifetime_minutes: i64) {
    println!("{} {}", "✓".green().bold(), "Server ready".white().bold());
    println!("  {} {}", "→".dimmed(), format!("http://{}", addr).cyan().underline());
    println!(
        "  {} {} {} {}",
        "→".dimmed(),
        format!("iss={}", issuer).dimmed(),
        format!("aud={}", audience).dimmed(),
        format!("ttl={}m", lifetime_minutes).dimmed()
    );
    println!();
    println!("{}", "Endpoints:".white().bold());
    println!("  {} {}     {}", "POST".yellow(), "/auth/login".white(), "Issue bearer token".dimmed());
    println!("  {} {}  {}", "POST".yellow(), "/auth/register".white(), "Validate registration".dimmed());
    println!("  {} {} {}", "GET ".green(), "/secure/profile".white(), "Caller claims".dimmed());
    println!("  {} {}    {}", "GET ".green(), "/secure/data".white(), "Sample data".dimmed());
    println!("  {} {}   {}", "GET ".green(), "/secure/admin".white(), "Admin role only".dimmed());
    println!("  {} {}         {}", "GET ".green(), "/metrics".white(), "Telemetry".dimmed());
    println!("  {} {}          {}", "GET ".green(), "/health".white(), "Health check".dimmed());
    println!();
}

// === Badges ===

fn badge(text: &str, fg: colored::Color, bg: colored::Color) -> colored::ColoredString {
    format!(" {} ", text).color(fg).on_color(bg).bold()
}

fn short_jti(jti: &str) -> &str {
    jti.get(..8).unwrap_or(jti)
}

// === Core Events ===

pub fn log_login(sub: &str, role: &str, jti: &str) {
    println!(
        "{} {} {} {} {} {}",
        badge("LOGIN", colored::Color::Black, colored::Color::Green),
        "sub:".dimmed(), sub.white(),
        "role:".dimmed(), role.cyan(),
        format!("jti:{}", short_jti(jti)).dimmed()
    );
}

pub fn log_login_failure(username: &str) {
    println!(
        "{} {} {}",
        badge("LOGIN", colored::Color::White, colored::Color::Red),
        format!("user:{}", username).yellow(),
        "bad credentials".red()
    );
}

pub fn log_reject(reason: &str) {
    println!("{} {}", badge("DENY", colored::Color::White, colored::Color::Red), reason.red());
}

pub fn log_forbidden(sub: &str, role: &str) {
    println!(
        "{} {} {} {}",
        badge("ROLE", colored::Color::White, colored::Color::Red),
        format!("sub:{}", sub).yellow(),
        format!("role:{}", role).white(),
        "FORBIDDEN".red().bold()
    );
}

// === Rate Limiting ===

pub fn log_rate_limited(key: &str, reason: &str) {
    println!(
        "{} {} {} {}",
        badge("RATE", colored::Color::Black, colored::Color::Yellow),
        key.yellow(),
        "→".dimmed(),
        reason.yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_jti_truncates_long_ids() {
        assert_eq!(short_jti("0123456789abcdef"), "01234567");
    }

    #[test]
    fn banner_title_tracks_package_version() {
        assert!(banner_title().ends_with(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn short_jti_keeps_short_ids() {
        assert_eq!(short_jti("abc"), "abc");
    }
}
