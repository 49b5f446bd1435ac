use crate::normalizer::paragraphs;
use crate::types::{ArticleRecord, Result};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    /// One JSON object per line.
    Json,
}

pub fn render_articles<W: Write>(
    out: &mut W,
    articles: &[ArticleRecord],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(out, articles),
        OutputFormat::Json => render_json(out, articles),
    }
}

fn render_text<W: Write>(out: &mut W, articles: &[ArticleRecord]) -> Result<()> {
    if articles.is_empty() {
        writeln!(out, "No articles stored yet.")?;
        return Ok(());
    }

    for (index, article) in articles.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "[{}] {}", article.category, article.name)?;
        writeln!(out, "    {} | {}", article.date, article.link)?;
        for paragraph in paragraphs(&article.content)
            .into_iter()
            .filter(|p| !p.trim().is_empty())
        {
            writeln!(out, "    {}", paragraph.trim())?;
        }
    }
    Ok(())
}

fn render_json<W: Write>(out: &mut W, articles: &[ArticleRecord]) -> Result<()> {
    for article in articles {
        serde_json::to_writer(&mut *out, article)?;
        writeln!(out)?;
    }
    Ok(())
}
