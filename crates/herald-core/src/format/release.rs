//! Release formatters.

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    payload::{parse, present, repo_name, Release, ReleaseEvent},
    truncate, FormatOptions, RELEASE_BODY_LIMIT,
};
use crate::models::{Embed, EmbedField, EmbedFooter, Message};

const COLOR: u32 = 0xf1c40f;

struct Parts {
    release: Release,
    tag: String,
    repo: String,
}

fn parts(payload: &Value, options: FormatOptions) -> Option<Parts> {
    let event: ReleaseEvent = parse(payload, "release")?;
    let release = event.release.unwrap_or_default();

    if release.draft.unwrap_or(false) && !options.include_drafts {
        debug!("Skipping draft release");
        return None;
    }

    let (Some(tag), Some(repo)) = (present(release.tag_name.clone()), repo_name(event.repository)) else {
        warn!("Release event missing tag name or repository name");
        return None;
    };

    Some(Parts { release, tag, repo })
}

pub(super) fn detailed(payload: &Value, options: FormatOptions) -> Message {
    let Some(Parts { release, tag, repo }) = parts(payload, options) else {
        return Message::empty();
    };

    let name = present(release.name).unwrap_or_else(|| tag.clone());

    Message::embed(Embed {
        title: format!("🚀 New Release: {name}"),
        url: present(release.html_url),
        description: present(release.body).map(|body| truncate(&body, RELEASE_BODY_LIMIT)),
        color: COLOR,
        fields: vec![EmbedField::inline("Tag", tag), EmbedField::inline("Repository", repo)],
        footer: Some(EmbedFooter::new("Release Notes")),
        timestamp: None,
    })
}

pub(super) fn simple(payload: &Value, options: FormatOptions) -> Message {
    let Some(Parts { release, tag, .. }) = parts(payload, options) else {
        return Message::empty();
    };

    let headline = if release.prerelease.unwrap_or(false) {
        "Pre-Release Available!"
    } else {
        "Release Available!"
    };
    let link = match present(release.html_url) {
        Some(url) => format!("[{tag}]({url})"),
        None => tag,
    };

    Message::content(format!("🎉 **{headline}** {link} is out now!"))
}
