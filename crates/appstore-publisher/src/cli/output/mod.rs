//! Output formatting utilities

use console::{style, Style};

use appstore_publisher_stores::{ApkTargeting, TargetingStatus};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for identifiers (edit and APK ids)
pub fn id_style() -> Style {
    Style::new().cyan()
}

/// Style for a device targeting status
pub fn status_style(status: &TargetingStatus) -> Style {
    match status {
        TargetingStatus::Targeting => Style::new().green(),
        TargetingStatus::NotTargeting => Style::new().dim(),
        TargetingStatus::Other(_) => Style::new().yellow(),
    }
}

/// Print the device table of an APK's targeting
pub fn print_targeting(targeting: &ApkTargeting) {
    for (title, devices) in [
        ("Amazon devices", &targeting.amazon_devices),
        ("Non-Amazon devices", &targeting.non_amazon_devices),
    ] {
        println!("{}", header(title));
        if devices.is_empty() {
            println!("  {}", style("(none)").dim());
        }
        for device in devices {
            let status = status_style(&device.status).apply_to(device.status.to_string());
            println!("  {:<24} {:<32} {}", device.id, device.name, status);
            if let Some(reason) = &device.reason {
                if let Some(text) = &reason.reason {
                    println!("  {:<24} {}", "", style(text).dim());
                }
            }
        }
    }

    if let Some(other) = &targeting.other_android_devices {
        println!("{}", key_value("Other Android devices", other));
    }
}
