use tokio::process::Command;

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    // Check for yt-dlp
    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for caption extraction and audio download".to_string());
    }

    // Check for whisper (only needed when every caption source fails)
    if !check_command_available("whisper").await {
        missing.push("whisper - required for the speech-to-text fallback".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
