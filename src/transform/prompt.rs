//! Image parameter hints parsed from the latest user prompt
//!
//! Recognised keywords:
//! - resolution: `4K`, `2K`, `1K` as standalone tokens, checked in that order
//! - aspect ratio: explicit `W:H` tokens (ASCII or full-width colon), then
//!   landscape / portrait / square phrases in English or Chinese

use once_cell::sync::Lazy;
use regex::Regex;

use crate::transform::image_config::{AspectRatio, ImageSize};
use crate::types::Message;

/// Partial image config inferred from prompt text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptHints {
    pub image_size: Option<ImageSize>,
    pub aspect_ratio: Option<AspectRatio>,
}

// ASCII word boundaries: CJK text directly around the token still matches.
static RESOLUTION_PATTERNS: Lazy<Vec<(Regex, ImageSize)>> = Lazy::new(|| {
    [("4k", ImageSize::FourK), ("2k", ImageSize::TwoK), ("1k", ImageSize::OneK)]
        .into_iter()
        .map(|(token, size)| {
            let pattern = format!(r"(?i)(?:^|[^0-9A-Za-z_]){}(?:$|[^0-9A-Za-z_])", token);
            (Regex::new(&pattern).unwrap(), size)
        })
        .collect()
});

/// One ordered chain: explicit ratios first, then semantic phrases
static ASPECT_RATIO_PATTERNS: Lazy<Vec<(Regex, AspectRatio)>> = Lazy::new(|| {
    [
        (r"16[:：]9", AspectRatio::Landscape16x9),
        (r"9[:：]16", AspectRatio::Portrait9x16),
        (r"1[:：]1", AspectRatio::Square),
        (r"4[:：]3", AspectRatio::Landscape4x3),
        (r"3[:：]4", AspectRatio::Portrait3x4),
        (r"3[:：]2", AspectRatio::Landscape3x2),
        (r"2[:：]3", AspectRatio::Portrait2x3),
        (r"(?i)横(屏|版|图)|landscape|widescreen|宽屏", AspectRatio::Landscape16x9),
        (r"(?i)竖(屏|版|图)|portrait|vertical|手机壁纸", AspectRatio::Portrait9x16),
        (r"(?i)方(形|图)|square|正方", AspectRatio::Square),
    ]
    .into_iter()
    .map(|(pattern, ratio)| (Regex::new(pattern).unwrap(), ratio))
    .collect()
});

/// Infer hints from the last `user` message; empty when there is none
pub fn infer_from_messages<'a, I>(messages: I) -> PromptHints
where
    I: IntoIterator<Item = &'a Message>,
    I::IntoIter: DoubleEndedIterator,
{
    messages
        .into_iter()
        .rev()
        .find(|m| m.role() == Some("user"))
        .map(|m| infer_from_text(m.text()))
        .unwrap_or_default()
}

pub fn infer_from_text(text: &str) -> PromptHints {
    PromptHints {
        image_size: first_match(&RESOLUTION_PATTERNS, text),
        aspect_ratio: first_match(&ASPECT_RATIO_PATTERNS, text),
    }
}

fn first_match<T: Copy>(patterns: &[(Regex, T)], text: &str) -> Option<T> {
    patterns
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, value)| *value)
}
