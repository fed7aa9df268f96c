//! # Core Domain Entities
//!
//! Addresses, ids and framework object handles exchanged with the host.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A host-owned object (asset, scene asset, form logic). Opaque to the bridge.
pub type AssetObject = Arc<dyn Any + Send + Sync>;

/// A decoded network message as delivered by a channel.
pub type MessageObject = Arc<dyn Any + Send + Sync>;

/// Caller data passed through to the host untouched.
pub type UserData = Arc<dyn Any + Send + Sync>;

/// Host load priority. Larger values are scheduled first.
pub type Priority = i32;

// =============================================================================
// ASSETS
// =============================================================================

/// Location of an asset inside a resource package.
///
/// An empty `package_name` means the host's current package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetAddress {
    /// Resource package the asset lives in.
    #[serde(default)]
    pub package_name: String,
    /// Location of the asset within the package.
    pub location: String,
}

impl AssetAddress {
    /// Address an asset inside a named package.
    pub fn new(package_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            location: location.into(),
        }
    }

    /// Address an asset in the host's current package.
    pub fn in_current_package(location: impl Into<String>) -> Self {
        Self::new(String::new(), location)
    }

    /// Canonical path form, used as the asset-load correlation key.
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_name.is_empty() {
            write!(f, "{}", self.location)
        } else {
            write!(f, "{}/{}", self.package_name, self.location)
        }
    }
}

/// The runtime type a caller asks the loader to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetKind {
    /// Element type.
    pub type_id: TypeId,
    /// Element type name, for diagnostics.
    pub type_name: &'static str,
    /// Whether the request is for all sub-assets of that type.
    pub is_array: bool,
}

impl AssetKind {
    /// A single asset of type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            is_array: false,
        }
    }

    /// No type constraint; the loader decides.
    pub fn any() -> Self {
        Self {
            type_id: TypeId::of::<dyn Any>(),
            type_name: "any",
            is_array: false,
        }
    }

    /// All sub-assets of type `T`.
    pub fn array_of<T: Any>() -> Self {
        Self::of::<T>().as_array()
    }

    /// The array form of this kind.
    #[must_use]
    pub fn as_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// The element form of this kind.
    #[must_use]
    pub fn element(mut self) -> Self {
        self.is_array = false;
        self
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "[{}]", self.type_name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}

/// What the resource loader produced for a request.
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    /// One asset.
    Single(AssetObject),
    /// Sub-assets of a composite asset.
    Many(Vec<AssetObject>),
}

impl LoadedAsset {
    /// True for sub-asset results.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// Resource loader status codes reported with a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadResourceStatus {
    Success,
    NotExist,
    NotReady,
    DependencyError,
    TypeError,
    AssetError,
}

impl fmt::Display for LoadResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// ENTITIES & UI FORMS
// =============================================================================

/// Caller-chosen entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned serial id of an opening UI form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialId(pub i32);

impl fmt::Display for SerialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A shown entity.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Name of the logic type driving the entity.
    pub logic_type: String,
    pub asset_address: AssetAddress,
    pub group: String,
    /// Host instance handle.
    pub instance: Option<AssetObject>,
}

/// An opened UI form.
#[derive(Debug, Clone)]
pub struct UiForm {
    pub serial_id: SerialId,
    pub asset_name: String,
    pub group: String,
    /// Form logic component, when the host exposes one.
    pub logic: Option<AssetObject>,
}

// =============================================================================
// SCENES
// =============================================================================

/// A loaded scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub name: String,
    pub address: AssetAddress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSceneMode {
    #[default]
    Single,
    Additive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalPhysicsMode {
    #[default]
    None,
    Physics2D,
    Physics3D,
}

/// Parameters forwarded to the scene manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSceneParameters {
    pub mode: LoadSceneMode,
    pub physics: LocalPhysicsMode,
}

impl LoadSceneParameters {
    pub fn new(mode: LoadSceneMode, physics: LocalPhysicsMode) -> Self {
        Self { mode, physics }
    }
}

/// Progress of a game scene load reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameSceneLoadState {
    LoadingScene,
    Initializing,
    /// A failed attempt is being retried; `retry_count` retries done so far.
    Retrying { retry_count: u32 },
    Completed,
    Failed,
}

// =============================================================================
// NETWORK
// =============================================================================

/// Identity of a network channel (its registered name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Runtime type of a network message.
///
/// Equality and hashing use the type id only.
#[derive(Debug, Clone, Copy)]
pub struct MessageType {
    pub id: TypeId,
    pub name: &'static str,
}

impl MessageType {
    pub fn of<M: Any>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// Runtime type of the value behind a type-erased message.
    pub fn of_object(message: &MessageObject) -> Self {
        let object: &dyn Any = &**message;
        Self {
            id: object.type_id(),
            name: "<type-erased>",
        }
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Error classes reported by a network channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkErrorCode {
    Unknown,
    AddressFamilyError,
    SocketError,
    ConnectError,
    SendError,
    ReceiveError,
    SerializeError,
    DeserializePacketHeaderError,
    DeserializePacketError,
}

impl NetworkErrorCode {
    /// Errors raised while establishing the connection. These concern the
    /// pending connect only; every other code affects the whole channel.
    pub fn is_connection_phase(&self) -> bool {
        matches!(self, Self::ConnectError)
    }
}

impl fmt::Display for NetworkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
