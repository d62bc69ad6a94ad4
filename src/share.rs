//! Clipboard and social-share helpers.

use log::info;
use std::borrow::Cow;
use url::Url;

use crate::error::{Error, Result};
use crate::i18n::{group_digits, Period};
use crate::plotting::RenderedChart;
use crate::settings::ShareOptions;

const LOG_TARGET: &str = "share";

/// Values substituted into a share template.
#[derive(Clone, Debug, PartialEq)]
pub struct ShareContext {
    pub username: String,
    pub total: Option<u32>,
    pub period: Period,
    pub profile_url: String,
}

fn period_phrase(period: Period) -> String {
    match period {
        Period::LastYear => "in the last year".to_string(),
        Period::Year(year) => format!("in {year}"),
        Period::AllTime => "in total".to_string(),
    }
}

/// Fill `{user}`, `{total}`, `{period}` and `{url}` in `template`.
///
/// Placeholders switched off by `options` are removed and the leftover
/// whitespace collapsed.
pub fn render_share_text(template: &str, ctx: &ShareContext, options: &ShareOptions) -> String {
    let total = match ctx.total {
        Some(total) if options.include_total => {
            let noun = if total == 1 { "contribution" } else { "contributions" };
            format!("{} {noun}", group_digits(total))
        }
        _ => "contributions".to_string(),
    };
    let url = if options.include_link { ctx.profile_url.as_str() } else { "" };

    let text = template
        .replace("{user}", &ctx.username)
        .replace("{total}", &total)
        .replace("{period}", &period_phrase(ctx.period))
        .replace("{url}", url);

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareTarget {
    X,
    LinkedIn,
    Facebook,
    Reddit,
    Weibo,
}

impl ShareTarget {
    pub const ALL: [ShareTarget; 5] = [
        ShareTarget::X,
        ShareTarget::LinkedIn,
        ShareTarget::Facebook,
        ShareTarget::Reddit,
        ShareTarget::Weibo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShareTarget::X => "X",
            ShareTarget::LinkedIn => "LinkedIn",
            ShareTarget::Facebook => "Facebook",
            ShareTarget::Reddit => "Reddit",
            ShareTarget::Weibo => "Weibo",
        }
    }

    /// The site's share-intent URL carrying `text` and `link`.
    pub fn share_url(self, text: &str, link: &str) -> Result<Url> {
        match self {
            ShareTarget::X => intent_url("https://twitter.com/intent/tweet", &[("text", text)]),
            ShareTarget::LinkedIn => intent_url("https://www.linkedin.com/sharing/share-offsite/", &[("url", link)]),
            ShareTarget::Facebook => intent_url("https://www.facebook.com/sharer/sharer.php", &[("u", link), ("quote", text)]),
            ShareTarget::Reddit => intent_url("https://www.reddit.com/submit", &[("url", link), ("title", text)]),
            ShareTarget::Weibo => intent_url("https://service.weibo.com/share/share.php", &[("url", link), ("title", text)]),
        }
    }
}

fn intent_url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
    Ok(Url::parse_with_params(base, params)?)
}

/// Open the share page of `target` in the default browser.
pub fn open_share(target: ShareTarget, text: &str, link: &str) -> Result<()> {
    let url = target.share_url(text, link)?;
    info!(target: LOG_TARGET, "Opening {} share page", target.label());
    open::that(url.as_str())?;
    Ok(())
}

pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| Error::Clipboard(e.to_string()))
}

pub fn copy_image(chart: &RenderedChart) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    let image = arboard::ImageData {
        width: chart.width as usize,
        height: chart.height as usize,
        bytes: Cow::Owned(chart.to_rgba()),
    };
    clipboard.set_image(image).map_err(|e| Error::Clipboard(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context() -> ShareContext {
        ShareContext {
            username: "octocat".to_string(),
            total: Some(1234),
            period: Period::Year(2023),
            profile_url: "https://github.com/octocat".to_string(),
        }
    }

    #[test]
    fn test_render_full_template() {
        let text = render_share_text("{user} made {total} on GitHub {period}! {url}", &context(), &ShareOptions::default());
        assert_eq!(text, "octocat made 1,234 contributions on GitHub in 2023! https://github.com/octocat");
    }

    #[test]
    fn test_render_without_total_and_link() {
        let options = ShareOptions {
            include_total: false,
            include_link: false,
            copy_image: false,
        };
        let text = render_share_text("{user} made {total} on GitHub {period}! {url}", &context(), &options);
        assert_eq!(text, "octocat made contributions on GitHub in 2023!");
    }

    #[test]
    fn test_share_urls_are_encoded() {
        let url = ShareTarget::X.share_url("I made 5 contributions & more", "https://github.com/octocat").unwrap();
        assert_eq!(url.host_str(), Some("twitter.com"));
        let text: Vec<_> = url.query_pairs().filter(|(k, _)| k == "text").map(|(_, v)| v.into_owned()).collect();
        assert_eq!(text, vec!["I made 5 contributions & more"]);

        for target in ShareTarget::ALL {
            let url = target.share_url("hello", "https://github.com/octocat").unwrap();
            assert_eq!(url.scheme(), "https");
        }
    }
}
