//! Naver search results page backend.
//!
//! Scrapes the news tab of `search.naver.com` for when no API credentials
//! are available. The page layout changes without notice, so every piece of
//! parsing lives here: the rest of the pipeline only ever sees
//! [`CandidateRecord`]s with RFC 2822 timestamps.
//!
//! # Page Structure
//!
//! Each result is a `div.news_area` holding the headline link
//! (`a.news_tit`), a snippet (`.news_dsc`), and an info row with the press
//! name, a relative timestamp such as `3시간 전`, and optionally a link to
//! the Naver-hosted copy of the article.

use super::{NewsSource, build_client};
use crate::models::CandidateRecord;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, instrument, warn};

const SEARCH_URL: &str = "https://search.naver.com/search.naver";

/// Offset of the timestamps shown on the page (KST).
const KST_SECONDS: i32 = 9 * 3600;

static RESULT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.news_area").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.news_tit").unwrap());
static SNIPPET: Lazy<Selector> = Lazy::new(|| Selector::parse(".news_dsc").unwrap());
static INFO: Lazy<Selector> = Lazy::new(|| Selector::parse(".info_group span.info").unwrap());
static INFO_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse(".info_group a.info").unwrap());

static RELATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*(분|시간|일|주)\s*전$").unwrap());
static ABSOLUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\.(\d{1,2})\.(\d{1,2})\.?$").unwrap());

/// Scraper for the Naver news search page.
#[derive(Debug)]
pub struct NaverHtmlSource {
    client: Client,
}

impl NaverHtmlSource {
    pub fn new(timeout: StdDuration) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

impl NewsSource for NaverHtmlSource {
    fn name(&self) -> &str {
        "naver-html"
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, keyword: &str) -> Result<Vec<CandidateRecord>, Box<dyn Error>> {
        let url = format!(
            "{}?where=news&sort=1&query={}",
            SEARCH_URL,
            urlencoding::encode(keyword)
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("Naver search page returned status {status}").into());
        }
        let body = response.text().await?;

        let now = Utc::now().with_timezone(&kst());
        let records = parse_results(&body, keyword, now);
        if records.is_empty() {
            warn!("No result cards found; the page layout may have changed");
        }
        debug!(count = records.len(), "Parsed Naver search page");
        Ok(records)
    }
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Extract candidate records from a search results page.
///
/// Cards without a headline link are skipped.
fn parse_results(html: &str, keyword: &str, now: DateTime<FixedOffset>) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .filter_map(|card| parse_card(card, keyword, now))
        .collect()
}

fn parse_card(card: ElementRef<'_>, keyword: &str, now: DateTime<FixedOffset>) -> Option<CandidateRecord> {
    let headline = card.select(&TITLE).next()?;
    let original = headline.value().attr("href")?.trim().to_string();
    // still markup; the aggregator decodes it once
    let title = headline.inner_html();

    let description = card
        .select(&SNIPPET)
        .next()
        .map(|e| e.inner_html())
        .unwrap_or_default();

    let naver_link = card
        .select(&INFO_LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("n.news.naver.com"))
        .map(str::to_string);

    let publish_date = card
        .select(&INFO)
        .map(|e| e.text().collect::<String>())
        .find_map(|text| resolve_timestamp(text.trim(), now))
        .map(|t| t.to_rfc2822())
        .unwrap_or_default();

    Some(CandidateRecord {
        keyword: keyword.to_string(),
        title,
        description,
        link: naver_link.unwrap_or_else(|| original.clone()),
        original_link: Some(original),
        publish_date,
    })
}

/// Turn the page's timestamp labels into absolute times.
///
/// Understands `N분 전`, `N시간 전`, `N일 전`, `N주 전` and `YYYY.MM.DD.`;
/// anything else (press names, page numbers) yields `None`.
fn resolve_timestamp(label: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    if let Some(caps) = RELATIVE.captures(label) {
        let n: i64 = caps[1].parse().ok()?;
        let ago = match &caps[2] {
            "분" => Duration::try_minutes(n)?,
            "시간" => Duration::try_hours(n)?,
            "일" => Duration::try_days(n)?,
            "주" => Duration::try_weeks(n)?,
            _ => return None,
        };
        return now.checked_sub_signed(ago);
    }
    if let Some(caps) = ABSOLUTE.captures(label) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return now.offset().from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_publish_time;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-18T21:00:00+09:00").unwrap()
    }

    const PAGE: &str = r#"
    <html><body><ul class="list_news">
      <li class="bx"><div class="news_wrap"><div class="news_area">
        <div class="news_info"><div class="info_group">
          <a class="info press" href="https://www.yna.co.kr">연합뉴스</a>
          <span class="info">3시간 전</span>
          <a class="info" href="https://n.news.naver.com/mnews/article/001/0014000000?sid=100">네이버뉴스</a>
        </div></div>
        <a class="news_tit" href="https://www.yna.co.kr/view/AKR1" title="육군 동계 훈련 돌입">육군 동계 훈련 돌입</a>
        <div class="news_dsc"><div class="dsc_wrap"><mark>육군</mark>이 훈련에 들어갔다.</div></div>
      </div></div></li>
      <li class="bx"><div class="news_wrap"><div class="news_area">
        <div class="news_info"><div class="info_group">
          <a class="info press" href="https://example.com">Example</a>
          <span class="info">2026.10.01.</span>
        </div></div>
        <a class="news_tit" href="https://example.com/story">Older story</a>
      </div></div></li>
      <li class="bx"><div class="news_wrap"><div class="news_area">
        <span class="info">1분 전</span>
      </div></div></li>
    </ul></body></html>"#;

    #[test]
    fn test_parse_results() {
        let records = parse_results(PAGE, "육군", now());
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title, "육군 동계 훈련 돌입");
        assert_eq!(
            first.link,
            "https://n.news.naver.com/mnews/article/001/0014000000?sid=100"
        );
        assert_eq!(first.original_link.as_deref(), Some("https://www.yna.co.kr/view/AKR1"));
        assert!(first.description.contains("훈련에 들어갔다"));
        assert_eq!(
            parse_publish_time(&first.publish_date),
            Some(DateTime::parse_from_rfc3339("2026-10-18T18:00:00+09:00").unwrap())
        );

        let second = &records[1];
        assert_eq!(second.link, "https://example.com/story");
        assert_eq!(second.title, "Older story");
        assert_eq!(
            parse_publish_time(&second.publish_date),
            Some(DateTime::parse_from_rfc3339("2026-10-01T00:00:00+09:00").unwrap())
        );
    }

    #[test]
    fn test_headline_with_angle_brackets_survives_normalization() {
        let page = r#"<div class="news_area">
            <a class="news_tit" href="https://example.com/x" title="&lt;단독&gt; 육군 훈련">&lt;단독&gt; <mark>육군</mark> 훈련</a>
        </div>"#;
        let records = parse_results(page, "육군", now());
        assert_eq!(records.len(), 1);

        let keywords = vec!["육군".to_string()];
        let article = crate::aggregate::normalize(records[0].clone(), &keywords).unwrap();
        assert_eq!(article.title, "<단독> 육군 훈련");
    }

    #[test]
    fn test_resolve_relative_timestamps() {
        let n = now();
        assert_eq!(resolve_timestamp("5분 전", n), Some(n - Duration::minutes(5)));
        assert_eq!(resolve_timestamp("2시간 전", n), Some(n - Duration::hours(2)));
        assert_eq!(resolve_timestamp("1일 전", n), Some(n - Duration::days(1)));
        assert_eq!(resolve_timestamp("1주 전", n), Some(n - Duration::weeks(1)));
    }

    #[test]
    fn test_resolve_ignores_other_labels() {
        let n = now();
        assert_eq!(resolve_timestamp("연합뉴스", n), None);
        assert_eq!(resolve_timestamp("A12면", n), None);
        assert_eq!(resolve_timestamp("2026.13.40.", n), None);
        assert_eq!(resolve_timestamp("99999999999999999분 전", n), None);
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        assert!(parse_results("<html></html>", "x", now()).is_empty());
    }
}
