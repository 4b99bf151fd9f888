use colored::*;

pub fn header(msg: &str) {
    tracing::info!("\n{}", format!("=== {} ===", msg).cyan().bold());
}

pub fn success(msg: &str) {
    tracing::info!("{} {}", "✓".green(), msg.green());
}

pub fn error(msg: &str) {
    tracing::info!("{} {}", "Error:".red(), msg.red());
}

pub fn info(msg: &str) {
    tracing::info!("{}", msg);
}

pub fn warning(msg: &str) {
    tracing::info!("{}", msg.yellow());
}
