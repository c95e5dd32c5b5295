//! Jekyll post rendering and writing.
//!
//! # Output
//!
//! ```text
//! ---
//! layout: post
//! title: "Bio-Fundamentals: Gizzard Function and Mechanical Digestion Efficiency"
//! date: 2026-10-19
//! image: https://images.pexels.com/...
//! category: textbook
//! ---
//!
//! <generated body>
//!
//! ---
//! *attribution footer*
//! ```
//!
//! The file goes to `{posts_dir}/{YYYY-MM-DD}-{sanitized title}.md`. An
//! existing file with the same name is overwritten. The directory is not
//! created; a missing `_posts/` is an error.

use crate::models::{FrontMatter, GeneratedPost};
use crate::utils::sanitize_title;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Attribution appended below every post.
pub const FOOTER: &str = "*This digest was synthesized by the Farm Bio-Strategist AI, utilizing both recent literature and foundational avian science textbooks.*";

/// Path of the post file for `title` published on `date`.
pub fn post_path(posts_dir: &Path, date: NaiveDate, title: &str) -> PathBuf {
    posts_dir.join(format!(
        "{}-{}.md",
        date.format("%Y-%m-%d"),
        sanitize_title(title)
    ))
}

/// Build the YAML header lines for `front_matter`.
///
/// The title is always double-quoted; the image URL stays a plain scalar.
/// Jekyll parses YAML 1.1, where a bare `yes`, `no`, `on` or `off` is a
/// boolean. A JSON string is a valid YAML double-quoted scalar, escapes
/// included.
fn front_matter_block(front_matter: &FrontMatter) -> Result<String, Box<dyn Error>> {
    let mut block = String::new();
    writeln!(block, "layout: {}", front_matter.layout)?;
    writeln!(block, "title: {}", serde_json::to_string(&front_matter.title)?)?;
    writeln!(block, "date: {}", front_matter.date)?;
    writeln!(block, "image: {}", front_matter.image)?;
    if let Some(category) = front_matter.category {
        writeln!(block, "category: {}", category.as_str())?;
    }
    Ok(block)
}

/// Render front matter, body and footer.
///
/// The header is parsed back with `serde_yaml` before returning, so a post is
/// never written with front matter Jekyll would read differently.
///
/// # Errors
///
/// Returns an error if the header does not parse back to the same values.
pub fn render_post(post: &GeneratedPost) -> Result<String, Box<dyn Error>> {
    let front_matter = FrontMatter::from(post);
    let block = front_matter_block(&front_matter)?;

    let reparsed: FrontMatter = serde_yaml::from_str(&block)?;
    if reparsed != front_matter {
        error!(header = %block, "Front matter does not round-trip");
        return Err("front matter does not round-trip through YAML".into());
    }

    Ok(format!(
        "---\n{block}---\n\n{body}\n\n---\n{FOOTER}\n",
        body = post.body.trim_end()
    ))
}

/// Render `post` and write it under `posts_dir`.
///
/// The file name comes from [`post_path`]. An existing file with the same name
/// is overwritten, and `posts_dir` is never created.
///
/// # Arguments
///
/// * `posts_dir` - Jekyll `_posts` directory; must already exist
/// * `post` - The finished post
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written (for
/// example when `posts_dir` is missing). A failed write may leave a partial
/// file behind.
#[instrument(level = "info", skip_all, fields(posts_dir = %posts_dir.display(), title = %post.title))]
pub async fn write_post(posts_dir: &Path, post: &GeneratedPost) -> Result<PathBuf, Box<dyn Error>> {
    let content = render_post(post)?;
    let path = post_path(posts_dir, post.date, &post.title);

    if fs::try_exists(&path).await.unwrap_or(false) {
        info!(path = %path.display(), "Overwriting existing post");
    }
    if let Err(e) = fs::write(&path, content.as_bytes()).await {
        error!(path = %path.display(), error = %e, "Failed writing post");
        return Err(e.into());
    }
    info!(path = %path.display(), bytes = content.len(), "Wrote post");
    Ok(path)
}

/// Split a rendered post back into its front matter and the rest.
#[cfg(test)]
pub fn split_front_matter(doc: &str) -> Option<(FrontMatter, &str)> {
    let rest = doc.strip_prefix("---\n")?;
    let (yaml, body) = rest.split_once("\n---\n")?;
    Some((serde_yaml::from_str(yaml).ok()?, body))
}
