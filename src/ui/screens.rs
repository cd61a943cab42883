// Screens - markdown for each wizard step

use crate::wizard::gallery::Gallery;
use crate::wizard::intake::ACCEPTED_TYPES;
use crate::wizard::progress::ProgressSnapshot;
use crate::wizard::types::{GenerationMode, UploadedImage};
use std::fmt::Write;

const HEADER: &str = "# ✨ AI Photo Studio\n\
*Transform your photos into professional headshots, creative portraits, and more.*\n\n";

const BAR_WIDTH: usize = 40;

pub fn upload_screen(drop_dir: Option<&str>) -> String {
    let mut md = String::from(HEADER);
    md.push_str("## How it works\n");
    md.push_str("* **1. Upload Photo** Start with any portrait or selfie. A clear, well-lit photo works best.\n");
    md.push_str("* **2. Generate** Choose a style or write a custom prompt to transform your image with AI.\n");
    md.push_str("* **3. Download** Save your favorite AI-generated creations in high resolution.\n\n");

    match drop_dir {
        Some(dir) => {
            let _ = writeln!(md, "📥 Drop your photo into `{}`", dir);
        }
        None => md.push_str("📷 Enter the path of your photo\n"),
    }
    let _ = writeln!(md, "\n*Accepted: {}*", ACCEPTED_TYPES.join(", "));
    md
}

pub fn options_screen(image: &UploadedImage, error: Option<&str>) -> String {
    let mut md = String::from(HEADER);

    if let Some(error) = error {
        let _ = writeln!(md, "> ⚠️  **{}**\n", error);
    }

    md.push_str("## Your Photo\n");
    let _ = writeln!(
        md,
        "`{}` ({}, {}×{})\n",
        image.file_name, image.mime_type, image.width, image.height
    );

    md.push_str("## Choose a Style\n");
    let custom = GenerationMode::Custom(String::new());
    for (key, mode) in [
        ("1", &GenerationMode::Professional),
        ("2", &GenerationMode::Creative),
        ("3", &custom),
    ] {
        let _ = writeln!(md, "* **[{}] {}** {}", key, mode.title(), mode.description());
    }

    md.push_str("\n*[b] use a different photo   [q] quit*\n");
    md
}

/// Prompt shown before reading a custom instruction
pub fn custom_prompt_screen() -> String {
    let mut md = String::from(HEADER);
    md.push_str("## Custom Instructions\n");
    md.push_str("Enter your own prompt to generate a custom image, e.g. *add a superhero cape*.\n");
    md.push_str("*An empty prompt goes back to the styles.*\n");
    md
}

pub fn loading_screen(snapshot: &ProgressSnapshot) -> String {
    let mut md = String::from(HEADER);
    md.push_str("## ⏳ Generating Your Images...\n");
    let _ = writeln!(md, "*{}*\n", snapshot.message);
    let _ = writeln!(md, "`{}`", progress_bar(snapshot.percent, BAR_WIDTH));
    md
}

pub fn results_screen(gallery: &Gallery, focus: usize, status: Option<&str>) -> String {
    let mut md = String::from(HEADER);
    md.push_str("## Your Results\n");
    md.push_str("*Select a thumbnail to view it. Download your favorite!*\n\n");

    let selected = gallery.selected();
    let _ = writeln!(
        md,
        "### {} ({} of {})",
        Gallery::label(selected),
        selected + 1,
        gallery.len()
    );
    if let Some(prompt) = &gallery.selected_entry().prompt {
        let _ = writeln!(md, "> {}", prompt);
    }
    let _ = writeln!(md, "{}\n", size_label(&gallery.selected_entry().data_url));

    md.push_str("### Variations\n");
    for index in 0..gallery.len() {
        let marker = if index == selected { "▶" } else { " " };
        let cursor = if index == focus { "›" } else { " " };
        let _ = writeln!(md, "* {}{} **[{}]** {}", cursor, marker, index, Gallery::label(index));
    }

    md.push_str("\n*[←/→] browse   [0-9] select   [tab] focus   [enter/space] open   [d] download   [s] start over   [q] quit*\n");

    if let Some(status) = status {
        let _ = writeln!(md, "\n{}", status);
    }
    md
}

pub fn progress_bar(percent: f32, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f32).round() as usize;
    format!(
        "{}{} {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(width - filled.min(width)),
        percent
    )
}

/// Approximate decoded size of a data URL
fn size_label(data_url: &str) -> String {
    let payload = data_url.split_once(',').map(|(_, p)| p.len()).unwrap_or(0);
    let bytes = payload / 4 * 3;
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::gallery::GalleryEntry;

    fn photo() -> UploadedImage {
        UploadedImage {
            data_url: "data:image/png;base64,AAAA".to_string(),
            mime_type: "image/png".to_string(),
            width: 800,
            height: 600,
            file_name: "me.png".to_string(),
        }
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "░░░░   0%");
        assert_eq!(progress_bar(50.0, 4), "██░░  50%");
        assert_eq!(progress_bar(150.0, 4), "████ 100%");
    }

    #[test]
    fn test_options_screen_shows_error_and_styles() {
        let md = options_screen(&photo(), Some("boom"));
        assert!(md.contains("boom"));
        assert!(md.contains("800×600"));
        assert!(md.contains("Generate Professional Poses"));
        assert!(md.contains("Custom Instructions"));

        assert!(!options_screen(&photo(), None).contains("⚠️"));
    }

    #[test]
    fn test_upload_screen_mentions_drop_folder() {
        assert!(upload_screen(Some("/tmp/inbox")).contains("/tmp/inbox"));
        assert!(upload_screen(None).contains("image/heic"));
    }

    #[test]
    fn test_results_screen_marks_selection() {
        let gallery = Gallery::from_parts(
            "data:image/png;base64,AAAA",
            vec![GalleryEntry {
                data_url: "data:image/png;base64,BBBB".to_string(),
                prompt: Some("navy suit".to_string()),
            }],
        );
        let md = results_screen(&gallery, 0, Some("saved"));
        assert!(md.contains("Variation 1 (2 of 2)"));
        assert!(md.contains("> navy suit"));
        assert!(md.contains("ORIGINAL"));
        assert!(md.contains("saved"));
    }

    #[test]
    fn test_loading_screen() {
        let md = loading_screen(&ProgressSnapshot {
            message: "Analyzing your photo...".to_string(),
            percent: 42.0,
        });
        assert!(md.contains("Analyzing your photo..."));
        assert!(md.contains("42%"));
    }
}
