//! Console output utilities.

use console::style;

use crate::content::ContentDescriptor;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Insta Downloader                                  ║
║     Public Instagram posts, reels and profiles        ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print the listen address and CORS policy at startup.
pub fn print_server_summary(bind_addr: &str, allowed_origins: &[String]) {
    println!();
    println!("{}", style("Server:").bold());
    println!("  Listening: http://{}", bind_addr);
    if allowed_origins.is_empty() {
        println!("  CORS: any origin");
    } else {
        println!("  CORS: {}", allowed_origins.join(", "));
    }
    println!();
}

/// Print a resolved descriptor with its download menu.
pub fn print_descriptor(descriptor: &ContentDescriptor) {
    println!();
    println!("{}", style(&descriptor.title).bold());
    println!("  Type: {}", descriptor.content_type);
    println!("  User: @{}", descriptor.username);
    if let Some(description) = &descriptor.description {
        println!("  {}", style(description).dim());
    }
    if let Some(thumbnail) = &descriptor.thumbnail_url {
        println!("  Thumbnail: {}", style(thumbnail).dim());
    }

    println!();
    println!("{}", style("Download options:").bold());
    for (key, option) in &descriptor.download_options {
        if option.available {
            println!("  {} {:<18} {}", style("✓").green(), key.to_string(), option.description);
        } else {
            println!(
                "  {} {:<18} {}",
                style("✗").red(),
                key.to_string(),
                style(&option.description).dim()
            );
        }
    }
    println!();
}
