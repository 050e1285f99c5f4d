//! HTML parsers for post pages, listing pages, and rendered comment threads
//!
//! All parsers are pure functions over page HTML so they can be tested
//! without a network or a browser.

use crate::post::{parse_timestamp_date, Comment, PostRecord};
use crate::FetchError;
use scraper::{ElementRef, Html, Selector};

/// Signature the mobile app appends to bodies and comments
const APP_SIGNATURE: &str = "- dc official App";

const DATE_SELECTOR: &str = "div.view_content_wrap span.gall_date";
const HEADER_SELECTOR: &str = "div.view_content_wrap span.title_headtext";
const TITLE_SELECTOR: &str = "div.view_content_wrap span.title_subject";
const CONTENT_SELECTOR: &str = "div.view_content_wrap div.writing_view_box div.write_div";
const VIEW_COUNT_SELECTOR: &str = "div.view_content_wrap span.gall_count";

const LISTING_ROW_SELECTOR: &str = "tr.us-post[data-no]";
const NOTICE_ROW_TYPE: &str = "icon_notice";

/// Present once the comment layer has rendered at least one text comment
pub const COMMENTS_READY_SELECTOR: &str = "ul.cmt_list li[id^='comment_li_'] p.usertxt.ub-word";
const COMMENT_ITEM_SELECTOR: &str = "ul.cmt_list.add > li[id^='comment_li_']";
const COMMENT_TEXT_SELECTOR: &str = "p.usertxt.ub-word";
const REPLY_ITEM_SELECTOR: &str = "li[id^='reply_li_']";

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|_| FetchError::Selector(css.to_string()))
}

/// Collects an element's text with each fragment trimmed
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

fn select_text(document: &Html, css: &str) -> Result<Option<String>, FetchError> {
    let sel = selector(css)?;
    Ok(document.select(&sel).next().map(|el| el.text().collect::<String>()))
}

fn remove_signature(text: &str) -> String {
    text.replace(APP_SIGNATURE, "").trim().to_string()
}

/// Reduces counter text such as `"조회 1,234"` to its digits
fn parse_count(post_id: u64, field: &'static str, raw: &str) -> Result<u64, FetchError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| FetchError::InvalidCount {
        post_id,
        field,
        raw: raw.trim().to_string(),
    })
}

/// Parses a post view page into a record without comments
///
/// # Returns
///
/// * `Ok(Some(PostRecord))` - The post exists
/// * `Ok(None)` - The page carries no post date, i.e. the post was deleted
/// * `Err(FetchError)` - The post exists but a required field is missing or malformed
pub fn parse_post_page(html: &str, post_id: u64) -> Result<Option<PostRecord>, FetchError> {
    let document = Html::parse_document(html);

    let Some(raw_date) = select_text(&document, DATE_SELECTOR)? else {
        return Ok(None);
    };
    let date = parse_timestamp_date(&raw_date).ok_or_else(|| FetchError::InvalidDate {
        post_id,
        raw: raw_date.trim().to_string(),
    })?;

    let header = select_text(&document, HEADER_SELECTOR)?
        .map(|h| h.replace('[', "").replace(']', "").trim().to_string())
        .unwrap_or_default();

    let title = select_text(&document, TITLE_SELECTOR)?
        .map(|t| t.trim().to_string())
        .ok_or(FetchError::MissingField {
            post_id,
            field: "title",
        })?;

    let content = select_text(&document, CONTENT_SELECTOR)?
        .map(|c| remove_signature(&c))
        .unwrap_or_default();

    let recommend = select_text(&document, &format!("#recommend_view_up_{}", post_id))?.ok_or(
        FetchError::MissingField {
            post_id,
            field: "recommend_count",
        },
    )?;
    let nonrecommend = select_text(&document, &format!("#recommend_view_down_{}", post_id))?
        .ok_or(FetchError::MissingField {
            post_id,
            field: "nonrecommend_count",
        })?;
    let views = select_text(&document, VIEW_COUNT_SELECTOR)?.ok_or(FetchError::MissingField {
        post_id,
        field: "view_count",
    })?;

    Ok(Some(PostRecord {
        post_id,
        date,
        header,
        title,
        view_count: parse_count(post_id, "view_count", &views)?,
        content,
        recommend_count: parse_count(post_id, "recommend_count", &recommend)?,
        nonrecommend_count: parse_count(post_id, "nonrecommend_count", &nonrecommend)?,
        comments: Vec::new(),
    }))
}

/// Finds the newest regular post id on a listing page
///
/// Pinned notice rows are skipped. Returns `None` when no regular row is listed.
pub fn parse_recent_post_id(html: &str) -> Result<Option<u64>, FetchError> {
    let document = Html::parse_document(html);
    let rows = selector(LISTING_ROW_SELECTOR)?;

    let recent = document
        .select(&rows)
        .filter(|row| row.value().attr("data-type") != Some(NOTICE_ROW_TYPE))
        .filter_map(|row| row.value().attr("data-no"))
        .find_map(|no| no.trim().parse::<u64>().ok());

    Ok(recent)
}

/// Parses a rendered comment thread
///
/// Each top-level comment is an `li[id^='comment_li_']`; its replies live in
/// `ul.reply_list#reply_list_{id}` inside the next sibling `li`. Comments and
/// replies without text are dropped.
pub fn parse_comments(html: &str) -> Result<Vec<Comment>, FetchError> {
    let document = Html::parse_document(html);
    let items = selector(COMMENT_ITEM_SELECTOR)?;
    let text_sel = selector(COMMENT_TEXT_SELECTOR)?;
    let reply_item_sel = selector(REPLY_ITEM_SELECTOR)?;

    let mut comments = Vec::new();
    for item in document.select(&items) {
        let text = item
            .select(&text_sel)
            .next()
            .map(|p| remove_signature(&stripped_text(p)))
            .unwrap_or_default();
        if text.is_empty() {
            // Sticker or image comment
            continue;
        }

        let comment_id = item
            .value()
            .attr("id")
            .and_then(|id| id.rsplit('_').next())
            .unwrap_or_default();

        let mut replies = Vec::new();
        if let Some(sibling) = item
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .filter(|el| el.value().name() == "li")
        {
            let reply_list = selector(&format!("ul.reply_list#reply_list_{}", comment_id))?;
            if let Some(list) = sibling.select(&reply_list).next() {
                for reply in list.select(&reply_item_sel) {
                    let reply_text = reply
                        .select(&text_sel)
                        .next()
                        .map(|p| remove_signature(&stripped_text(p)))
                        .unwrap_or_default();
                    replies.push(reply_text);
                }
            }
        }

        comments.extend(Comment::new(text, replies));
    }

    Ok(comments)
}
