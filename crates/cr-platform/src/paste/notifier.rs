use anyhow::Result;
use cr_core::ports::ManualPasteNotifierPort;
use tracing::warn;

const APP_NAME: &str = "ClipRecall";

/// Desktop notification telling the user to paste by hand.
pub struct SystemNotifier;

impl ManualPasteNotifierPort for SystemNotifier {
    fn notify_manual_paste(&self, title: &str) -> Result<()> {
        let message = manual_paste_message(title);
        warn!(title, "Automatic paste unavailable, asked user to paste manually");
        show(&message)
    }
}

pub fn manual_paste_message(title: &str) -> String {
    format!("\"{title}\" is on the clipboard. Press the paste shortcut to insert it.")
}

#[cfg(target_os = "macos")]
fn show(message: &str) -> Result<()> {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(message),
        APP_NAME
    );
    let status = std::process::Command::new("osascript")
        .args(["-e", &script])
        .status()?;
    anyhow::ensure!(status.success(), "osascript exited with {status}");
    Ok(())
}

#[cfg(target_os = "linux")]
fn show(message: &str) -> Result<()> {
    let status = std::process::Command::new("notify-send")
        .args([APP_NAME, message])
        .status()?;
    anyhow::ensure!(status.success(), "notify-send exited with {status}");
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn show(message: &str) -> Result<()> {
    tracing::info!(app = APP_NAME, message, "Manual paste required");
    Ok(())
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
