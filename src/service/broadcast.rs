use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{config::Config, service::regions::RegionDirectory};

pub const NOT_AVAILABLE: &str = "정보 없음";
pub const LOAD_FAILED: &str = "정보 로드 실패";

const TITLE_SELECTOR: &str = "p.greeting-text > b#forumName";
const SUBTITLE_SELECTOR: &str = "p.greeting-text > span";
const MC_PATTERN: &str = r"MC\s*[:：]\s*([^|│｜\n\r]*)";
const TIME_PATTERN: &str = r"방송시간\s*[:：]\s*([0-9:~\s]+)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastInfo {
    pub title: String,
    pub mc: String,
    pub time: String,
    pub region_code: String,
    pub region_name: String,
}

impl BroadcastInfo {
    fn from_snapshot(snapshot: ProgramSnapshot, region_code: &str, region_name: String) -> Self {
        let or_placeholder =
            |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            title: or_placeholder(snapshot.title),
            mc: or_placeholder(snapshot.mc),
            time: or_placeholder(snapshot.time),
            region_code: region_code.to_string(),
            region_name,
        }
    }

    fn load_failed(region_code: &str, region_name: String) -> Self {
        Self {
            title: LOAD_FAILED.to_string(),
            mc: LOAD_FAILED.to_string(),
            time: LOAD_FAILED.to_string(),
            region_code: region_code.to_string(),
            region_name,
        }
    }
}

/// Fields mined from the on-air page; `None` when the page did not carry them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgramSnapshot {
    pub title: Option<String>,
    pub mc: Option<String>,
    pub time: Option<String>,
}

#[derive(Error, Debug)]
pub enum LookupFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("parse failed: {0}")]
    Parse(String),
}

impl LookupFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) | Self::Status(_) => "fetch",
            Self::Parse(_) => "parse",
        }
    }
}

#[async_trait]
pub trait BroadcastLookup: Send + Sync {
    /// Current programme of a region. Never fails: problems yield placeholder text.
    async fn lookup(&self, region_code: &str) -> BroadcastInfo;
}

/// Compiled selectors and patterns for the on-air page, built once per service.
pub struct ProgramExtractor {
    title: Selector,
    subtitle: Selector,
    mc: Regex,
    time: Regex,
}

impl ProgramExtractor {
    pub fn new() -> Result<Self, LookupFailure> {
        let selector =
            |css: &str| Selector::parse(css).map_err(|err| LookupFailure::Parse(err.to_string()));
        let pattern =
            |re: &str| Regex::new(re).map_err(|err| LookupFailure::Parse(err.to_string()));

        Ok(Self {
            title: selector(TITLE_SELECTOR)?,
            subtitle: selector(SUBTITLE_SELECTOR)?,
            mc: pattern(MC_PATTERN)?,
            time: pattern(TIME_PATTERN)?,
        })
    }

    /// Pulls title, MC and air time out of the on-air HTML fragment.
    pub fn extract(&self, html: &str) -> ProgramSnapshot {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(normalized_text)
            .filter(|title| !title.is_empty());

        let (mc, time) = match document.select(&self.subtitle).next() {
            Some(span) => {
                // e.g. "MC : 강세민 | 방송시간 : 18:05 ~ 19:55"
                let text = normalized_text(span);
                (capture(&self.mc, &text), capture(&self.time, &text))
            }
            None => (None, None),
        };

        ProgramSnapshot { title, mc, time }
    }
}

pub struct TbnBroadcastService {
    client: reqwest::Client,
    base_url: String,
    regions: Arc<RegionDirectory>,
    extractor: ProgramExtractor,
}

impl TbnBroadcastService {
    pub fn new(config: &Config, regions: Arc<RegionDirectory>) -> Result<Self, LookupFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.broadcast_timeout_seconds))
            .user_agent(config.broadcast_user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.broadcast_base_url.clone(),
            regions,
            extractor: ProgramExtractor::new()?,
        })
    }

    fn page_url(&self, region_code: &str) -> String {
        let delimiter = if self.base_url.contains('?') { "&" } else { "?" };
        format!(
            "{}{}area_code={}",
            self.base_url,
            delimiter,
            urlencoding::encode(region_code)
        )
    }

    pub async fn fetch_program(&self, region_code: &str) -> Result<ProgramSnapshot, LookupFailure> {
        let response = self.client.get(self.page_url(region_code)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Status(status));
        }
        let body = response.text().await?;
        Ok(self.extractor.extract(&body))
    }
}

#[async_trait]
impl BroadcastLookup for TbnBroadcastService {
    async fn lookup(&self, region_code: &str) -> BroadcastInfo {
        let region_name = self.regions.name_or_unknown(region_code);
        match self.fetch_program(region_code).await {
            Ok(snapshot) => BroadcastInfo::from_snapshot(snapshot, region_code, region_name),
            Err(failure) => {
                tracing::warn!(
                    region_code,
                    kind = failure.kind(),
                    error = %failure,
                    "broadcast lookup failed"
                );
                BroadcastInfo::load_failed(region_code, region_name)
            }
        }
    }
}

fn normalized_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
