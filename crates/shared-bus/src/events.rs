//! # Framework Events
//!
//! Terminal events fired by the host services when an operation they started
//! completes. Each carries the key the operation was started with.

use crate::envelope::GameEvent;
use shared_types::{
    AssetAddress, AssetObject, ChannelId, Entity, EntityId, MessageObject, MessageType,
    NetworkErrorCode, SerialId, UiForm,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// SCENES
// =============================================================================

#[derive(Debug, Clone)]
pub struct LoadSceneSuccess {
    pub scene_asset_address: AssetAddress,
    /// The loaded scene asset; `None` if the host lost it.
    pub scene_asset: Option<AssetObject>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct LoadSceneFailure {
    pub scene_asset_address: AssetAddress,
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct UnloadSceneSuccess {
    pub scene_asset_address: AssetAddress,
}

#[derive(Debug, Clone)]
pub struct UnloadSceneFailure {
    pub scene_asset_address: AssetAddress,
    pub error_message: String,
}

// =============================================================================
// ENTITIES & UI FORMS
// =============================================================================

#[derive(Debug, Clone)]
pub struct ShowEntitySuccess {
    pub entity: Entity,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ShowEntityFailure {
    pub entity_id: EntityId,
    pub entity_asset_address: AssetAddress,
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct OpenUiFormSuccess {
    pub ui_form: UiForm,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct OpenUiFormFailure {
    pub serial_id: SerialId,
    pub ui_form_asset_name: String,
    pub error_message: String,
}

// =============================================================================
// DATA TABLES
// =============================================================================

#[derive(Debug, Clone)]
pub struct LoadDataTableSuccess {
    pub data_table_asset_name: String,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct LoadDataTableFailure {
    pub data_table_asset_name: String,
    pub error_message: String,
}

// =============================================================================
// NETWORK
// =============================================================================

#[derive(Debug, Clone)]
pub struct NetworkConnected {
    pub channel: ChannelId,
}

#[derive(Debug, Clone)]
pub struct NetworkClosed {
    pub channel: ChannelId,
}

/// A decoded message arrived on a channel.
#[derive(Debug, Clone)]
pub struct NetworkMessage {
    pub channel: ChannelId,
    /// Runtime type of `message`.
    pub message_type: MessageType,
    pub message: MessageObject,
}

impl NetworkMessage {
    /// Wrap `message`. An already type-erased [`MessageObject`] is taken as is,
    /// so the event carries the type of the value behind it.
    pub fn new<M: Any + Send + Sync>(channel: ChannelId, message: M) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(message);
        match boxed.downcast::<MessageObject>() {
            Ok(object) => Self::from_object(channel, *object),
            Err(boxed) => Self {
                channel,
                message_type: MessageType::of::<M>(),
                message: Arc::from(boxed),
            },
        }
    }

    /// Wrap a message the host decoded without static type information.
    pub fn from_object(channel: ChannelId, message: MessageObject) -> Self {
        Self {
            channel,
            message_type: MessageType::of_object(&message),
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkError {
    pub channel: ChannelId,
    pub code: NetworkErrorCode,
    pub message: String,
}

impl GameEvent for LoadSceneSuccess {}
impl GameEvent for LoadSceneFailure {}
impl GameEvent for UnloadSceneSuccess {}
impl GameEvent for UnloadSceneFailure {}
impl GameEvent for ShowEntitySuccess {}
impl GameEvent for ShowEntityFailure {}
impl GameEvent for OpenUiFormSuccess {}
impl GameEvent for OpenUiFormFailure {}
impl GameEvent for LoadDataTableSuccess {}
impl GameEvent for LoadDataTableFailure {}
impl GameEvent for NetworkConnected {}
impl GameEvent for NetworkClosed {}
impl GameEvent for NetworkMessage {}
impl GameEvent for NetworkError {}
