// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder,
    ITunesOwnerBuilder,
};
use rss::extension::{ExtensionBuilder, ExtensionMap};
use rss::{Channel, ChannelBuilder, Enclosure, Guid, Item, ItemBuilder};

use crate::error::FeedError;
use crate::progress::{ReportEvent, SharedReporter};
use crate::record::ShowMeta;
use crate::resolve::{ResolvedEpisode, ShowVars};

/// Name of the feed document inside the output directory
pub const FEED_FILENAME: &str = "feed.xml";

const GOOGLEPLAY_NS: &str = "http://www.google.com/schemas/play-podcasts/1.0";

/// Feed-generation context: the eligibility rules applied to the resolved
/// episode set
#[derive(Debug, Clone, Copy)]
pub struct FeedContext {
    /// Include episodes whose source audio was not found (preview aid)
    pub include_missing_audio: bool,
    /// Wall-clock time captured at run start
    pub now: DateTime<Utc>,
}

impl FeedContext {
    /// Whether an episode belongs in the live feed. GUID presence is checked
    /// separately so it can warn.
    pub fn is_eligible(&self, episode: &ResolvedEpisode) -> bool {
        !episode.record.hidden
            && episode.pubdate <= self.now
            && (episode.has_audio() || self.include_missing_audio)
    }
}

fn build_item(episode: &ResolvedEpisode, vars: &ShowVars, guid: &str) -> Item {
    let itunes = ITunesItemExtensionBuilder::default()
        .author(Some(vars.authors.clone()))
        .subtitle(Some(episode.record.subtitle().to_string()))
        .summary(Some(episode.record.description.clone()))
        .duration(Some(episode.duration.clone()))
        .build();

    ItemBuilder::default()
        .title(Some(episode.record.title.clone()))
        .description(Some(episode.record.description.clone()))
        .pub_date(Some(episode.pubdate.to_rfc2822()))
        .enclosure(Some(Enclosure {
            url: episode.audio_uri.clone(),
            length: episode.info.size_bytes.to_string(),
            mime_type: "audio/mpeg".to_string(),
        }))
        .guid(Some(Guid {
            value: guid.to_string(),
            permalink: false,
        }))
        .itunes_ext(Some(itunes))
        .build()
}

/// Assemble the RSS document from the fully resolved episode set.
///
/// Episodes without a GUID are left out with a warning pointing at
/// `--add-guids`; eligibility otherwise follows [`FeedContext::is_eligible`].
pub fn build_channel(
    meta: &ShowMeta,
    vars: &ShowVars,
    context: &FeedContext,
    episodes: &[ResolvedEpisode],
    reporter: &SharedReporter,
) -> Channel {
    let mut items = Vec::new();
    for episode in episodes {
        if !context.is_eligible(episode) {
            continue;
        }
        match &episode.record.guid {
            Some(guid) => items.push(build_item(episode, vars, guid)),
            None => reporter.report(ReportEvent::MissingGuid {
                episode: episode.record.title.clone(),
            }),
        }
    }

    let owner = ITunesOwnerBuilder::default()
        .name(Some(vars.authors.clone()))
        .email(Some(meta.email.clone()))
        .build();

    let itunes = ITunesChannelExtensionBuilder::default()
        .author(Some(vars.authors.clone()))
        .owner(Some(owner))
        .categories(vec![
            ITunesCategoryBuilder::default()
                .text(meta.category.clone())
                .build(),
        ])
        .explicit(Some("no".to_string()))
        .keywords(Some(meta.keywords.join(",")))
        .subtitle(Some(meta.description.clone()))
        .summary(Some(meta.description.clone()))
        .image(Some(meta.remote_uri.cover_image.clone()))
        .r#type(Some("episodic".to_string()))
        .build();

    let atom = AtomExtension {
        links: vec![Link {
            href: meta.remote_uri.rss_feed.clone(),
            rel: "self".to_string(),
            mime_type: Some("application/rss+xml".to_string()),
            ..Default::default()
        }],
    };

    // googleplay mirrors the itunes category, written as a raw extension
    let googleplay_category = ExtensionBuilder::default()
        .name("googleplay:category".to_string())
        .attrs(BTreeMap::from([("text".to_string(), meta.category.clone())]))
        .build();
    let mut extensions = ExtensionMap::default();
    extensions.insert(
        "googleplay".to_string(),
        BTreeMap::from([("category".to_string(), vec![googleplay_category])]),
    );

    ChannelBuilder::default()
        .title(meta.title.clone())
        .link(meta.remote_uri.website.clone())
        .description(meta.description.clone())
        .language(Some(meta.language.clone()))
        .namespaces(BTreeMap::from([(
            "googleplay".to_string(),
            GOOGLEPLAY_NS.to_string(),
        )]))
        .itunes_ext(Some(itunes))
        .atom_ext(Some(atom))
        .extensions(extensions)
        .items(items)
        .build()
}

/// Serialize the feed document to its output location. The output directory
/// is created if it does not exist yet, since a run without any render action
/// (all episodes audio-less) still writes a feed.
pub fn write_feed(channel: &Channel, path: &Path) -> Result<(), FeedError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| FeedError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(path).map_err(|e| FeedError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    channel.pretty_write_to(file, b' ', 2)?;
    Ok(())
}
