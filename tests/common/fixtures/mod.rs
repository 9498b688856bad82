//! Sample tracks, users and channels used across the integration tests

use fake::Fake;
use fake::faker::lorem::en::Words;
use fake::faker::name::en::Name;
use serenity::model::id::{ChannelId, GuildId, UserId};

use rusty_dj::music::track::{Requester, Track};

pub const GUILD: GuildId = GuildId::new(424242);
pub const TEXT_CHANNEL: ChannelId = ChannelId::new(987654321);
pub const VOICE_CHANNEL: ChannelId = ChannelId::new(123123123);

pub fn requester() -> Requester {
    Requester::new(UserId::new(123456789), Name().fake::<String>())
}

/// A track with a generated author and a few minutes of runtime
pub fn track(title: &str) -> Track {
    let words: Vec<String> = Words(1..3).fake();
    Track::new(
        title,
        Name().fake::<String>(),
        format!("https://www.youtube.com/watch?v={}", words.join("-")),
        (60_000u64..300_000).fake::<u64>(),
    )
}

pub fn track_with_duration(title: &str, duration_ms: u64) -> Track {
    Track::new(
        title,
        "Test Artist",
        format!("https://example.com/{}", title),
        duration_ms,
    )
}
