//! Third-person follow camera with lock-on targeting.

mod config;
mod plugin;
mod rig;
mod targets;

pub use config::CameraSettings;
pub use plugin::{target_changed_event, CameraInput, CameraPlugin, FollowCamera, LockOnTargets};
pub use rig::CameraRig;
pub use targets::{
    target_weight, SelectionSettings, TargetChanged, TargetHandle, TargetRecord, TargetTracker, Viewpoint,
};
