use clap::Subcommand;
use tabled::Table;

use crate::{
    Error, error, info, success,
    types::{DeviceTableRow, track::format_duration},
    warning,
};

#[derive(Subcommand, Debug, Clone)]
pub enum PlayerCommand {
    /// Show what is playing
    Status,
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
    /// Skip to the next track
    Next,
    /// Skip to the previous track
    Previous,
    /// List available devices
    Devices,
}

pub async fn player(command: PlayerCommand) {
    let client = super::connect().await;
    let player = client.player();

    let action = match command {
        PlayerCommand::Status => return status(&client).await,
        PlayerCommand::Devices => return devices(&client).await,
        PlayerCommand::Pause => player.pause(None),
        PlayerCommand::Resume => player.play(Default::default(), None),
        PlayerCommand::Next => player.skip_next(None),
        PlayerCommand::Previous => player.skip_previous(None),
    };

    match action.suspend().await {
        Ok(()) => success!("Done"),
        Err(Error::Forbidden(reason)) => warning!("Not allowed: {}", reason),
        Err(Error::BadRequest { message, .. }) => warning!("{}", message),
        Err(e) => error!("Player command failed: {}", e),
    }
}

async fn status(client: &crate::Spotify) {
    let state = match client.player().playback_state().run().await {
        Ok(Some(state)) => state,
        Ok(None) => {
            info!("Nothing is playing");
            return;
        }
        Err(e) => error!("Failed to read playback state: {}", e),
    };

    let Some(item) = &state.item else {
        info!("Playing something without details (e.g. an ad)");
        return;
    };

    let marker = if state.is_playing { "Playing" } else { "Paused" };
    info!("{}: {} - {}", marker, item.creators(), item.name());
    info!(
        "{} / {}",
        format_duration(state.progress_ms.unwrap_or_default()),
        format_duration(item.duration_ms())
    );
    if let Some(device) = &state.device {
        info!("Device: {} ({})", device.name, device.kind);
    }
    info!("Shuffle: {}, repeat: {}", state.shuffle_state, state.repeat_state);
}

async fn devices(client: &crate::Spotify) {
    let devices = match client.player().devices().run().await {
        Ok(devices) => devices,
        Err(e) => error!("Failed to list devices: {}", e),
    };

    if devices.is_empty() {
        warning!("No devices available");
        return;
    }

    let rows: Vec<DeviceTableRow> = devices.iter().map(DeviceTableRow::from).collect();
    println!("{}", Table::new(rows));
}
