//! Footstep and landing sounds played through kira.

use bevy::prelude::*;
use bevy_kira_audio::{Audio, AudioControl, AudioSource};
use rand::Rng;

use crate::core::GameplaySet;
use crate::player::AnimationEvent;

/// Sounds a player animation can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Footstep,
    Land,
}

/// Which cue, if any, an animation event plays.
pub fn cue_for(event: &AnimationEvent) -> Option<AudioCue> {
    match event {
        AnimationEvent::FootstepLeft | AnimationEvent::FootstepRight => Some(AudioCue::Footstep),
        AnimationEvent::Land => Some(AudioCue::Land),
        _ => None,
    }
}

#[derive(Resource)]
struct CueSounds {
    footstep: Handle<AudioSource>,
    land: Handle<AudioSource>,
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_cue_sounds)
            .add_systems(Update, play_animation_cues.in_set(GameplaySet::Feedback));
    }
}

fn load_cue_sounds(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(CueSounds {
        footstep: asset_server.load("audio/footstep.ogg"),
        land: asset_server.load("audio/land.ogg"),
    });
}

fn play_animation_cues(
    mut events: EventReader<AnimationEvent>,
    sounds: Option<Res<CueSounds>>,
    audio: Res<Audio>,
) {
    let Some(sounds) = sounds else {
        events.clear();
        return;
    };

    let mut rng = rand::thread_rng();
    for event in events.read() {
        let (handle, volume) = match cue_for(event) {
            Some(AudioCue::Footstep) => (&sounds.footstep, 0.4_f64),
            Some(AudioCue::Land) => (&sounds.land, 0.7),
            None => continue,
        };
        // Slight pitch variation so repeated steps don't sound identical.
        audio
            .play(handle.clone())
            .with_volume(volume)
            .with_playback_rate(rng.gen_range(0.92_f64..1.08));
    }
}
