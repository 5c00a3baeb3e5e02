//! HTML parsing for listing, answer and category pages
//!
//! A listing page holds one `div#vragenrij_<number>` per question:
//!
//! ```html
//! <div id="vragenrij_81790">
//!   <div class="vragenrij">
//!     <span><a id="tag_12" href="tags/cycling">cycling</a> <a id="tag_40" href="tags/sporty">sporty</a></span>
//!     We zijn op zoek naar de beste wielrenner ter wereld...
//!     <center><img src="prodgfx/vragen/q/972d66f98fa6ccb0573b07d549ac3b76_81790.jpg"></center>
//!   </div>
//!   <div id="toonbron_81790"><div><span>
//!     Uit: <a href="quiz/fothemaquiz-34-2016"><strong>FothemaQuiz 34</strong> (2016)</a>,
//!     <a href="quiz/fothemaquiz-34-2016/1"><strong>ronde 1, vraag 11</strong></a>,
//!     door <a href="quizteam/pepeq"><strong>PépéQ</strong></a>
//!   </span></div></div>
//! </div>
//! ```
//!
//! Only the question number is mandatory. Everything else degrades to
//! "absent" with a warning.

use crate::site::SiteUrls;
use crate::storage::{QuizInfo, VideoRef};
use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id^="vragenrij_"]"#).expect("valid selector"));
static QUESTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.vragenrij").expect("valid selector"));
static TAG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[id^="tag_"]"#).expect("valid selector"));
static CENTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("center").expect("valid selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("valid selector"));
static EMBED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src], embed[src], a[href]").expect("valid selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static STRONG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("valid selector"));
static ANSWER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b").expect("valid selector"));
static CATEGORY_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div.col-lg-8 a[href*="categorie/"]"#).expect("valid selector")
});
static BIG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("big").expect("valid selector"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));
static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("valid regex"));
static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:youtube(?:-nocookie)?\.com/(?:embed/|v/|watch\?(?:.*&)?v=)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("valid regex")
});

const ROW_ID_PREFIX: &str = "vragenrij_";

/// Result of extracting one row; `Err` only when the question number is unusable
pub type RowResult = Result<QuestionRow, HarvestError>;

/// Everything a listing row tells about its question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub number: i64,
    /// Empty when the text could not be located
    pub text: String,
    pub tags: Vec<String>,
    pub media: RowMedia,
    pub quiz: Option<QuizInfo>,
}

/// The visual embedded in a row's `<center>` block
#[derive(Debug, Clone, PartialEq)]
pub enum RowMedia {
    None,
    /// Absolute image URL
    Image(String),
    Video(VideoRef),
}

/// One category from the site's category overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub slug: String,
    pub name: String,
    pub question_count: u32,
}

/// Extracts every question row of a listing page, in page order
///
/// A row whose id does not carry a number is returned as
/// [`HarvestError::RowStructure`]; callers stop processing the page there.
pub fn parse_listing(html: &str, urls: &SiteUrls, page_url: &str) -> Vec<RowResult> {
    let document = Html::parse_document(html);

    let rows: Vec<RowResult> = document
        .select(&ROW_SELECTOR)
        .map(|row| parse_row(row, urls, page_url))
        .collect();

    tracing::debug!("There are {} question rows on {}", rows.len(), page_url);
    rows
}

fn parse_row(row: ElementRef<'_>, urls: &SiteUrls, page_url: &str) -> RowResult {
    let number = parse_row_number(row.value().id().unwrap_or_default()).ok_or_else(|| {
        HarvestError::RowStructure {
            url: page_url.to_string(),
            message: format!(
                "row id '{}' does not carry a question number",
                row.value().id().unwrap_or_default()
            ),
        }
    })?;

    let text = extract_question_text(row).unwrap_or_else(|| {
        tracing::warn!("No question text found for question {}", number);
        String::new()
    });

    let tags = extract_tags(row);
    tracing::debug!("Tags for question {}: {:?}", number, tags);

    let media = extract_media(row, urls, number);

    let quiz = extract_quiz_info(row, urls, number);
    if quiz.is_none() {
        tracing::warn!("No information about the quiz could be found for question {}", number);
    }

    Ok(QuestionRow {
        number,
        text,
        tags,
        media,
        quiz,
    })
}

/// `vragenrij_82096` → `82096`
pub fn parse_row_number(row_id: &str) -> Option<i64> {
    let digits = row_id.strip_prefix(ROW_ID_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// The question is the loose text directly inside `div.vragenrij`; tags sit
/// in a `<span>` before it and the visual in a `<center>` after it.
fn extract_question_text(row: ElementRef<'_>) -> Option<String> {
    let container = row.select(&QUESTION_SELECTOR).next()?;

    let mut raw = String::new();
    for child in container.children() {
        match child.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(element) if element.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    let text = normalize_lines(&raw);
    (!text.is_empty()).then_some(text)
}

fn extract_tags(row: ElementRef<'_>) -> Vec<String> {
    row.select(&TAG_SELECTOR)
        .map(|tag| tag.text().collect::<String>().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn extract_media(row: ElementRef<'_>, urls: &SiteUrls, number: i64) -> RowMedia {
    let Some(center) = row.select(&CENTER_SELECTOR).next() else {
        tracing::debug!("Question {}: no visual in this row", number);
        return RowMedia::None;
    };

    if let Some(img) = center.select(&IMG_SELECTOR).next() {
        let src = img.value().attr("src").unwrap_or_default();
        return match urls.resolve(src) {
            Ok(url) => RowMedia::Image(url.to_string()),
            Err(e) => {
                tracing::warn!("Question {}: unusable image src '{}': {}", number, src, e);
                RowMedia::None
            }
        };
    }

    let video = center.select(&EMBED_SELECTOR).find_map(|embed| {
        let target = embed
            .value()
            .attr("src")
            .or_else(|| embed.value().attr("href"))?;
        parse_youtube_reference(target)
    });

    match video {
        Some(video) => {
            tracing::debug!("Question {}: embedded video {}", number, video.external_id);
            RowMedia::Video(video)
        }
        None => {
            tracing::warn!("Question {}: embedded visual is neither image nor video", number);
            RowMedia::None
        }
    }
}

/// Recognizes embed, watch and short YouTube links
pub fn parse_youtube_reference(target: &str) -> Option<VideoRef> {
    let id = YOUTUBE_RE.captures(target)?.get(1)?.as_str().to_string();
    Some(VideoRef {
        watch_url: format!("https://www.youtube.com/watch?v={}", id),
        external_id: id,
    })
}

/// Reads `div#toonbron_<number>`: quiz link, round link, organiser link
fn extract_quiz_info(row: ElementRef<'_>, urls: &SiteUrls, number: i64) -> Option<QuizInfo> {
    let selector = Selector::parse(&format!("div#toonbron_{}", number)).ok()?;
    let source = row.select(&selector).next()?;
    let links: Vec<ElementRef<'_>> = source.select(&LINK_SELECTOR).collect();

    let quiz_link = links.first()?;
    let name = strong_text(*quiz_link)?;
    let href = quiz_link.value().attr("href")?;
    let url = urls.resolve(href).ok()?.to_string();

    let year = quiz_link
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => YEAR_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            _ => None,
        })
        .next();

    let round = links.get(1).and_then(|link| strong_text(*link));
    let organiser = links.get(2).and_then(|link| strong_text(*link));

    let quiz = QuizInfo {
        name,
        year,
        url,
        organiser,
        round,
    };
    tracing::debug!("Quiz info for question {}: {:?}", number, quiz);
    Some(quiz)
}

fn strong_text(link: ElementRef<'_>) -> Option<String> {
    let text = link
        .select(&STRONG_SELECTOR)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

/// Extracts the answer from the answer endpoint's response
///
/// The answer is the first `<b>` element. Line breaks become `\n`.
pub fn parse_answer(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let bold = document.select(&ANSWER_SELECTOR).next()?;

    let mut raw = String::new();
    for node in bold.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(element) if element.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    Some(normalize_lines(&raw))
}

/// Reads the category overview: `<a href="categorie/{slug}"><big>{name}</big></a> ({count})`
pub fn parse_category_index(html: &str) -> Vec<CategoryListing> {
    let document = Html::parse_document(html);
    let mut categories = Vec::new();

    for link in document.select(&CATEGORY_LINK_SELECTOR) {
        let Some(slug) = link
            .value()
            .attr("href")
            .and_then(|href| href.split("categorie/").nth(1))
            .map(|slug| slug.trim_matches('/').to_string())
            .filter(|slug| !slug.is_empty() && !slug.contains('/'))
        else {
            continue;
        };

        let name = link
            .select(&BIG_SELECTOR)
            .next()
            .map(|big| big.text().collect::<String>())
            .unwrap_or_else(|| link.text().collect::<String>())
            .trim()
            .to_string();

        let Some(container) = link.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let container_text = container.text().collect::<String>();
        let Some(question_count) = COUNT_RE
            .captures(&container_text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
        else {
            tracing::warn!("No question count next to category '{}'", slug);
            continue;
        };

        tracing::debug!("#questions for {} ({}): {}", name, slug, question_count);
        categories.push(CategoryListing {
            slug,
            name,
            question_count,
        });
    }

    categories
}

/// Trims every line and drops the empty ones
fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
