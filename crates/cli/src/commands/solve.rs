//! `mathmentor solve` — Run the tutoring pipeline on one problem.
//!
//! The problem arrives as typed text, an image, or an audio clip; media is
//! transcribed first and the transcript feeds the pipeline unchanged. After
//! a successful run the user is asked to confirm the answer, and confirmed
//! answers are appended to the memory log.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use mathmentor_config::AppConfig;
use mathmentor_core::provider::{MediaInput, Transcriber};
use mathmentor_core::result::PipelineStatus;

pub async fn run(
    text: Option<String>,
    image: Option<PathBuf>,
    audio: Option<PathBuf>,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    super::require_api_key(&config)?;

    let provider = mathmentor_providers::build_from_config(&config)?;

    // --- Obtain the problem text ---
    let problem_text = if let Some(path) = image {
        let media = read_media(&path, image_mime(&path))?;
        eprint!("  Reading the image...");
        let transcript = provider.transcribe_image(media).await?;
        eprint!("\r                     \r");
        println!("📷 Transcribed: {transcript}\n");
        transcript
    } else if let Some(path) = audio {
        let media = read_media(&path, audio_mime(&path))?;
        eprint!("  Listening...");
        let transcript = provider.transcribe_audio(media).await?;
        eprint!("\r              \r");
        println!("🎤 Transcribed: {transcript}\n");
        transcript
    } else if let Some(text) = text {
        text
    } else {
        return Err("Nothing to solve. Pass the problem text, --image, or --audio.".into());
    };

    // --- Run the pipeline ---
    let (pipeline, _memory) = super::build_pipeline(&config, provider).await?;

    eprint!("  Thinking...");
    let result = match pipeline.run(&problem_text).await {
        Ok(result) => result,
        Err(e) => {
            eprint!("\r             \r");
            tracing::error!(error = %e, "pipeline run failed");
            return Err(
                "The solver hit a problem. Run `mathmentor doctor` to diagnose.".into(),
            );
        }
    };
    eprint!("\r             \r");

    // --- Render the result ---
    println!("🔍 Pipeline trace:");
    for entry in &result.trace {
        println!("   {entry}");
    }
    println!();

    if result.status == PipelineStatus::Hitl {
        println!(
            "🙋 {}",
            result.msg.as_deref().unwrap_or("Needs clarification")
        );
        println!("   Please rephrase the problem with more detail and try again.");
        return Ok(());
    }

    let solution = result.solution.unwrap_or_default();
    let explanation = result.explanation.unwrap_or_default();

    println!("🎓 Explanation:");
    for line in explanation.lines() {
        println!("   {line}");
    }
    println!();

    println!("⚙️  Full solution:");
    for line in solution.lines() {
        println!("   {line}");
    }
    println!();

    if let Some(context) = &result.context {
        println!("📚 Reference context used:");
        for line in context.lines() {
            println!("   {line}");
        }
        println!();
    }

    if let Some(confidence) = result.confidence {
        println!("🎯 Confidence: {:.0}%", confidence * 100.0);
        if confidence < 0.9 {
            println!("   ⚠️  The verifier flagged this solution. Double-check the steps.");
        }
        println!();
    }

    // --- Feedback ---
    let confirmed = if yes { true } else { prompt_feedback()? };
    if confirmed {
        let record = pipeline
            .confirm(&problem_text, &solution, &explanation)
            .await?;
        println!(
            "🧠 Saved to memory (record #{}). Future runs can reuse it.",
            record.id
        );
    }

    Ok(())
}

/// Ask whether the answer was correct. EOF and anything other than y/yes
/// count as no, so piped input never records feedback by accident.
fn prompt_feedback() -> std::io::Result<bool> {
    print!("Was this correct? [y/N] ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        println!();
        return Ok(false);
    }
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn read_media(path: &Path, mime_type: String) -> Result<MediaInput, Box<dyn std::error::Error>> {
    let data =
        std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(MediaInput::new(data, mime_type))
}

/// Map an image extension to its MIME type. Unknown extensions fall back
/// to PNG.
fn image_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg".into(),
        Some("webp") => "image/webp".into(),
        Some("gif") => "image/gif".into(),
        _ => "image/png".into(),
    }
}

/// Map an audio extension to its MIME type. Unknown extensions fall back
/// to MP3.
fn audio_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("wav") => "audio/wav".into(),
        Some("ogg") => "audio/ogg".into(),
        Some("m4a") => "audio/mp4".into(),
        Some("flac") => "audio/flac".into(),
        _ => "audio/mp3".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("problem.jpg")), "image/jpeg");
        assert_eq!(image_mime(Path::new("problem.JPEG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("scan.webp")), "image/webp");
        assert_eq!(image_mime(Path::new("whiteboard")), "image/png");
    }

    #[test]
    fn audio_mime_by_extension() {
        assert_eq!(audio_mime(Path::new("question.wav")), "audio/wav");
        assert_eq!(audio_mime(Path::new("question.m4a")), "audio/mp4");
        assert_eq!(audio_mime(Path::new("recording.mp3")), "audio/mp3");
        assert_eq!(audio_mime(Path::new("voice_note")), "audio/mp3");
    }
}
