// Preview capability used by the triage loop, plus a terminal implementation
// built on image, pdfium, csv, calamine, zip and the ffmpeg tool suite.

use crate::config::PreviewSettings;
use crate::domain::suffix_of;
use crate::error::{BroomError, Result};
use calamine::Reader;
use crossterm::style::{Color, Stylize};
use image::{DynamicImage, GenericImageView, Pixel};
use pdfium_render::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Smallest read window for markup formats, whose text is diluted by tags
const MIN_READ_BYTES: usize = 64 * 1024;

/// Renders or plays an entry's content. Every method may fail with
/// `PreviewUnavailable`, which callers report without ending the triage.
pub trait Previewer {
    fn show_image(&mut self, path: &Path, out: &mut dyn Write) -> Result<()>;

    /// Plays a bounded clip, stopping any previous playback first.
    fn play_audio(&mut self, path: &Path) -> Result<()>;

    /// Stops and releases the playback handle. No-op when nothing plays.
    fn stop_audio(&mut self);

    fn sample_video_frames(
        &mut self,
        path: &Path,
        max_frames: usize,
        out: &mut dyn Write,
    ) -> Result<()>;

    fn render_table(&mut self, path: &Path, max_rows: usize) -> Result<Vec<Vec<String>>>;

    fn extract_text(&mut self, path: &Path, max_chars: usize) -> Result<String>;

    fn extract_first_page_text(&mut self, path: &Path, max_chars: usize) -> Result<String>;
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;
    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        (original_width, original_height)
    } else {
        let new_width = ((original_width as f64 * ratio) as u32).max(1);
        let new_height = ((original_height as f64 * ratio) as u32).max(1);
        (new_width, new_height)
    }
}

/// Converts an image to terminal rows of upper half blocks (▀): the
/// foreground carries the upper pixel and the background the lower one.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<String> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let height = if height % 2 == 0 { height } else { height + 1 };

    let img = img
        .resize_exact(width, height, image::imageops::FilterType::Triangle)
        .to_rgb8();

    (0..height / 2)
        .map(|y| {
            let upper_y = y * 2;
            let lower_y = upper_y + 1;
            let mut line = String::new();
            for x in 0..width {
                let upper = img.get_pixel(x, upper_y).to_rgb();
                let lower = img.get_pixel(x, lower_y).to_rgb();
                let cell = "▀"
                    .with(Color::Rgb {
                        r: upper[0],
                        g: upper[1],
                        b: upper[2],
                    })
                    .on(Color::Rgb {
                        r: lower[0],
                        g: lower[1],
                        b: lower[2],
                    });
                line.push_str(&cell.to_string());
            }
            line
        })
        .collect()
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| BroomError::PreviewUnavailable(format!("image decode: {}", e)))
}

fn write_image(img: &DynamicImage, settings: &PreviewSettings, out: &mut dyn Write) -> Result<()> {
    let (original_width, original_height) = img.dimensions();
    let (width, height) = calculate_resize_dimensions(
        original_width,
        original_height,
        settings.max_image_width,
        settings.max_image_height,
    );

    for line in image_to_halfblock_lines(img, width, height) {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "     {}×{} px", original_width, original_height)?;
    out.flush()?;
    Ok(())
}

fn hold(millis: u64) {
    if millis > 0 {
        thread::sleep(Duration::from_millis(millis));
    }
}

/// Copies `path` to a scratch file that keeps its suffix. The copy is
/// removed when the returned handle drops.
fn scratch_copy(path: &Path) -> Result<tempfile::NamedTempFile> {
    let suffix = suffix_of(path);
    let scratch = tempfile::Builder::new()
        .prefix("broom-")
        .suffix(&suffix)
        .tempfile()?;
    fs::copy(path, scratch.path()).map_err(|e| BroomError::from_io(e, path))?;
    Ok(scratch)
}

/// Looks an executable up on `PATH`.
pub fn find_command(cmd: &str) -> Option<PathBuf> {
    let extensions: &[&str] = if cfg!(target_os = "windows") {
        &["", ".exe", ".cmd", ".bat"]
    } else {
        &[""]
    };

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        extensions
            .iter()
            .map(|ext| dir.join(format!("{}{}", cmd, ext)))
            .find(|candidate| candidate.is_file())
    })
}

fn media_duration(ffprobe: &Path, path: &Path) -> Option<f64> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

/// Offsets in seconds for `count` frames, spread evenly inside the video
/// when its duration is known, five seconds apart otherwise.
pub fn frame_offsets(duration: Option<f64>, count: usize) -> Vec<f64> {
    match duration {
        Some(d) if d > 0.0 => (1..=count)
            .map(|i| d * i as f64 / (count + 1) as f64)
            .collect(),
        _ => (0..count).map(|i| i as f64 * 5.0).collect(),
    }
}

/// Removes XML/HTML tags, turning paragraph and line-break tags into
/// newlines and dropping script/style bodies.
pub fn strip_markup(markup: &str) -> String {
    const BREAKS: &[&str] = &[
        "/w:p", "w:br", "w:br/", "/text:p", "/text:h", "text:line-break/", "/p", "br",
        "br/", "/div", "/li", "/tr", "/h1", "/h2", "/h3", "/h4", "/h5", "/h6",
    ];

    let mut text = String::with_capacity(markup.len() / 2);
    let mut tag = String::new();
    let mut in_tag = false;
    let mut skipping: Option<&str> = None;

    for ch in markup.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                match skipping {
                    Some(end) if name == end => skipping = None,
                    Some(_) => {}
                    None if name == "script" => skipping = Some("/script"),
                    None if name == "style" => skipping = Some("/style"),
                    None if BREAKS.contains(&name.as_str()) => text.push('\n'),
                    None => {}
                }
            }
            (true, c) => tag.push(c),
            (false, c) => {
                if skipping.is_none() {
                    text.push(c);
                }
            }
        }
    }

    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn read_prefix(path: &Path, max_bytes: usize) -> Result<String> {
    let file = fs::File::open(path).map_err(|e| BroomError::from_io(e, path))?;
    let mut buffer = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn zip_member_text(path: &Path, member: &str) -> Result<String> {
    let file = fs::File::open(path).map_err(|e| BroomError::from_io(e, path))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| BroomError::PreviewUnavailable(format!("not a zip container: {}", e)))?;
    let mut entry = archive
        .by_name(member)
        .map_err(|e| BroomError::PreviewUnavailable(format!("{}: {}", member, e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| BroomError::PreviewUnavailable(format!("{}: {}", member, e)))?;
    Ok(xml)
}

fn csv_rows(path: &Path, max_rows: usize) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| BroomError::PreviewUnavailable(e.to_string()))?;

    let mut rows = Vec::new();
    for record in reader.records().take(max_rows) {
        let record = record.map_err(|e| BroomError::PreviewUnavailable(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// First `max_rows` rows of the workbook's first worksheet.
fn spreadsheet_rows(path: &Path, max_rows: usize) -> Result<Vec<Vec<String>>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| BroomError::PreviewUnavailable(format!("spreadsheet: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| BroomError::PreviewUnavailable("workbook has no sheet".to_string()))?
        .map_err(|e| BroomError::PreviewUnavailable(format!("spreadsheet: {}", e)))?;

    Ok(range
        .rows()
        .take(max_rows)
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

/// Drops RTF control words, metadata groups and braces, keeping the
/// visible text. `\par` and `\line` become newlines.
pub fn strip_rtf(rtf: &str) -> String {
    const HIDDEN_GROUPS: &[&str] = &[
        "fonttbl", "colortbl", "stylesheet", "info", "pict", "header", "footer", "generator",
    ];

    let mut text = String::with_capacity(rtf.len() / 2);
    let mut chars = rtf.chars().peekable();
    let mut outer: Vec<bool> = Vec::new();
    let mut hidden = false;

    while let Some(ch) = chars.next() {
        match ch {
            '{' => outer.push(hidden),
            '}' => hidden = outer.pop().unwrap_or(false),
            '\\' => match chars.peek().copied() {
                Some(c @ ('\\' | '{' | '}')) => {
                    chars.next();
                    if !hidden {
                        text.push(c);
                    }
                }
                Some('\'') => {
                    chars.next();
                    let hex: String = chars.by_ref().take(2).collect();
                    if let (false, Ok(byte)) = (hidden, u8::from_str_radix(&hex, 16)) {
                        text.push(char::from(byte));
                    }
                }
                Some('*') => {
                    chars.next();
                    hidden = true;
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    let mut word = String::new();
                    while let Some(c) = chars.next_if(|c| c.is_ascii_alphabetic()) {
                        word.push(c);
                    }
                    while chars.next_if(|c| *c == '-' || c.is_ascii_digit()).is_some() {}
                    chars.next_if_eq(&' ');

                    if HIDDEN_GROUPS.contains(&word.as_str()) {
                        hidden = true;
                    } else if !hidden && (word == "par" || word == "line") {
                        text.push('\n');
                    } else if !hidden && word == "tab" {
                        text.push('\t');
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            '\r' | '\n' => {}
            c if !hidden => text.push(c),
            _ => {}
        }
    }

    text
}

/// Attempts to create a Pdfium instance using explicit binding (no panic)
fn try_create_pdfium() -> Option<Pdfium> {
    if let Ok(bindings) = Pdfium::bind_to_system_library() {
        return Some(Pdfium::new(bindings));
    }

    if let Ok(lib_path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&lib_path))
        {
            return Some(Pdfium::new(bindings));
        }
    }

    for dir in ["./lib/", "./"] {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Some(Pdfium::new(bindings));
        }
    }

    None
}

pub fn is_pdfium_available() -> bool {
    try_create_pdfium().is_some()
}

/// Previews straight to the terminal.
///
/// Audio and video rely on `ffplay`, `ffprobe` and `ffmpeg` being on `PATH`;
/// PDFs need a loadable Pdfium library.
#[derive(Debug)]
pub struct TerminalPreviewer {
    settings: PreviewSettings,
    audio: Option<Child>,
}

impl TerminalPreviewer {
    pub fn new(settings: PreviewSettings) -> Self {
        Self {
            settings,
            audio: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.audio.is_some()
    }
}

impl Previewer for TerminalPreviewer {
    fn show_image(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        // Decode from a scratch copy so files held open by other programs
        // can still be previewed.
        let scratch = scratch_copy(path)?;
        let img = load_image(scratch.path())?;
        write_image(&img, &self.settings, out)?;
        hold(self.settings.image_display_ms);
        Ok(())
    }

    fn play_audio(&mut self, path: &Path) -> Result<()> {
        self.stop_audio();

        let ffplay = find_command("ffplay")
            .ok_or_else(|| BroomError::PreviewUnavailable("ffplay not found".to_string()))?;
        let child = Command::new(ffplay)
            .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-t"])
            .arg(self.settings.audio_preview_secs.to_string())
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BroomError::PreviewUnavailable(format!("ffplay: {}", e)))?;

        debug!(path = %path.display(), pid = child.id(), "audio preview started");
        let child = self.audio.insert(child);
        // ffplay exits on its own once the clip length is reached
        child.wait()?;
        Ok(())
    }

    fn stop_audio(&mut self) {
        if let Some(mut child) = self.audio.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "audio preview already finished");
            }
            if let Err(e) = child.wait() {
                warn!(error = %e, "failed to reap audio preview");
            }
        }
    }

    fn sample_video_frames(
        &mut self,
        path: &Path,
        max_frames: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        let ffmpeg = find_command("ffmpeg")
            .ok_or_else(|| BroomError::PreviewUnavailable("ffmpeg not found".to_string()))?;
        let duration = find_command("ffprobe").and_then(|ffprobe| media_duration(&ffprobe, path));

        let scratch = tempfile::Builder::new().prefix("broom-frames-").tempdir()?;
        let mut shown = 0;

        for (i, offset) in frame_offsets(duration, max_frames).into_iter().enumerate() {
            let frame = scratch.path().join(format!("frame_{}.png", i));
            let status = Command::new(&ffmpeg)
                .args(["-v", "quiet", "-y", "-ss"])
                .arg(format!("{:.2}", offset))
                .arg("-i")
                .arg(path)
                .args(["-frames:v", "1"])
                .arg(&frame)
                .stdin(Stdio::null())
                .status()?;

            if !status.success() || !frame.exists() {
                debug!(offset, "no frame extracted");
                continue;
            }

            let img = match load_image(&frame) {
                Ok(img) => img,
                Err(e) => {
                    debug!(error = %e, "skipping undecodable frame");
                    continue;
                }
            };

            writeln!(out, "     frame {} @ {:.1}s", i + 1, offset)?;
            write_image(&img, &self.settings, out)?;
            hold(self.settings.frame_display_ms);
            shown += 1;
        }

        if shown == 0 {
            return Err(BroomError::PreviewUnavailable(
                "no frame could be extracted".to_string(),
            ));
        }
        Ok(())
    }

    fn render_table(&mut self, path: &Path, max_rows: usize) -> Result<Vec<Vec<String>>> {
        match suffix_of(path).as_str() {
            ".csv" => csv_rows(path, max_rows),
            ".xlsx" | ".xls" => spreadsheet_rows(path, max_rows),
            _ => Err(BroomError::PreviewUnavailable(format!(
                "tabular preview not supported for {}",
                path.display()
            ))),
        }
    }

    fn extract_text(&mut self, path: &Path, max_chars: usize) -> Result<String> {
        let window = (max_chars * 4).max(MIN_READ_BYTES);
        let text = match suffix_of(path).as_str() {
            ".docx" => strip_markup(&zip_member_text(path, "word/document.xml")?),
            ".odt" => strip_markup(&zip_member_text(path, "content.xml")?),
            ".htm" | ".html" => strip_markup(&read_prefix(path, window)?),
            ".rtf" => strip_rtf(&read_prefix(path, window)?),
            ".txt" | ".md" | ".csv" => read_prefix(path, max_chars * 4)?,
            other => {
                return Err(BroomError::PreviewUnavailable(format!(
                    "no text extractor for '{}'",
                    other
                )))
            }
        };
        Ok(truncate_chars(&text, max_chars))
    }

    fn extract_first_page_text(&mut self, path: &Path, max_chars: usize) -> Result<String> {
        let pdfium = try_create_pdfium().ok_or_else(|| {
            BroomError::PreviewUnavailable("Pdfium library not available".to_string())
        })?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| BroomError::PreviewUnavailable(format!("PDF loading error: {}", e)))?;
        let page = document
            .pages()
            .get(0)
            .map_err(|e| BroomError::PreviewUnavailable(format!("PDF page access error: {}", e)))?;
        let text = page
            .text()
            .map_err(|e| BroomError::PreviewUnavailable(format!("PDF text error: {}", e)))?;

        Ok(truncate_chars(&text.all(), max_chars))
    }
}

impl Drop for TerminalPreviewer {
    fn drop(&mut self) {
        self.stop_audio();
    }
}
