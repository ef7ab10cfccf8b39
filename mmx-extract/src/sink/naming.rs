//! Per-channel output naming

use std::path::{Path, PathBuf};

use mmx_common::config::ChannelNaming;
use mmx_common::pcm::{CHANNELS, MIXER_CHANNEL_NAMES};

use crate::{Error, Result};

/// File name for `channel`: `<base><n>.wav` or `<base><strip>.wav`
pub fn channel_file_name(base: &str, channel: usize, naming: ChannelNaming) -> Result<String> {
    if channel >= CHANNELS {
        return Err(Error::InvalidInput(format!(
            "Channel {} out of range 0..{}",
            channel, CHANNELS
        )));
    }

    Ok(match naming {
        ChannelNaming::Index => format!("{}{}.wav", base, channel),
        ChannelNaming::Mixer => format!("{}{}.wav", base, MIXER_CHANNEL_NAMES[channel]),
    })
}

/// Full output path for `channel` inside `dir`
pub fn channel_path(dir: &Path, base: &str, channel: usize, naming: ChannelNaming) -> Result<PathBuf> {
    Ok(dir.join(channel_file_name(base, channel, naming)?))
}
