//! Fake framework services.
//!
//! Every start call is recorded and its outcome queued on the bus, to be
//! delivered on the next `frame()`. Asset loads answer through their
//! callbacks instead, when the scenario calls `finish_asset_loads`.

use game_tasks::{
    DataTable, DataTableHost, EntityHost, GameSceneCallbacks, GameSceneHost, LoadAssetCallbacks,
    NetworkChannel, OpenUiFormRequest, ResourceLoader, RetryPolicy, RowType, SceneHost,
    ShowEntityRequest, TaskError, UiHost,
};
use parking_lot::Mutex;
use shared_bus::events::{
    LoadDataTableSuccess, LoadSceneFailure, LoadSceneSuccess, NetworkClosed, NetworkConnected,
    NetworkError, NetworkMessage, OpenUiFormSuccess, ShowEntitySuccess, UnloadSceneSuccess,
};
use shared_bus::{EventBusExt, InMemoryEventBus};
use shared_types::{
    AssetAddress, AssetKind, AssetObject, ChannelId, Entity, GameSceneLoadState, HostError,
    LoadSceneParameters, LoadedAsset, NetworkErrorCode, Priority, Scene, SerialId, UiForm, UserData,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

/// Fake implementation of every host service.
pub struct FakeFramework {
    bus: Arc<InMemoryEventBus>,
    starts: Mutex<Vec<String>>,
    next_serial: AtomicI32,
    scene_failures: AtomicU32,
    asset_loads: Mutex<Vec<(AssetAddress, Option<AssetKind>, LoadAssetCallbacks)>>,
}

impl FakeFramework {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Arc<Self> {
        Arc::new(Self {
            bus,
            starts: Mutex::new(Vec::new()),
            next_serial: AtomicI32::new(1),
            scene_failures: AtomicU32::new(0),
            asset_loads: Mutex::new(Vec::new()),
        })
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Deliver the outcomes queued so far.
    pub fn frame(&self) -> usize {
        self.bus.update()
    }

    /// Every start call so far, e.g. `"load-scene:main/scenes/menu"`.
    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().clone()
    }

    pub fn start_count(&self, prefix: &str) -> usize {
        self.starts
            .lock()
            .iter()
            .filter(|start| start.starts_with(prefix))
            .count()
    }

    /// Fail the next `count` scene loads (plain and game scene).
    pub fn fail_next_scene_loads(&self, count: u32) {
        self.scene_failures.store(count, Ordering::SeqCst);
    }

    /// Answer every pending asset load with `produce(address, kind)`.
    pub fn finish_asset_loads<F>(&self, produce: F) -> usize
    where
        F: Fn(&AssetAddress, Option<AssetKind>) -> Option<LoadedAsset>,
    {
        let loads: Vec<_> = self.asset_loads.lock().drain(..).collect();
        let count = loads.len();
        for (address, kind, callbacks) in loads {
            callbacks.succeed(produce(&address, kind), FRAME);
        }
        count
    }

    fn record(&self, start: String) {
        self.starts.lock().push(start);
    }

    fn take_scene_failure(&self) -> bool {
        self.scene_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl ResourceLoader for FakeFramework {
    fn load_asset(
        &self,
        address: &AssetAddress,
        kind: Option<AssetKind>,
        _priority: Option<Priority>,
        _user_data: Option<UserData>,
        callbacks: LoadAssetCallbacks,
    ) -> Result<(), HostError> {
        self.record(format!("load-asset:{address}"));
        self.asset_loads.lock().push((address.clone(), kind, callbacks));
        Ok(())
    }
}

impl EntityHost for FakeFramework {
    fn show_entity(&self, request: &ShowEntityRequest, priority: Priority) -> Result<(), HostError> {
        self.record(format!("show-entity:{}@{priority}", request.entity_id));
        self.bus.fire_event(ShowEntitySuccess {
            entity: Entity {
                id: request.entity_id,
                logic_type: request.logic_type.clone(),
                asset_address: request.asset_address.clone(),
                group: request.group.clone(),
                instance: None,
            },
            duration: FRAME,
        });
        Ok(())
    }
}

impl SceneHost for FakeFramework {
    fn load_scene(
        &self,
        address: &AssetAddress,
        _priority: Priority,
        _parameters: LoadSceneParameters,
    ) -> Result<(), HostError> {
        self.record(format!("load-scene:{address}"));
        if self.take_scene_failure() {
            self.bus.fire_event(LoadSceneFailure {
                scene_asset_address: address.clone(),
                error_message: "asset bundle missing".into(),
            });
        } else {
            let scene: AssetObject = Arc::new(Scene {
                name: address.location.clone(),
                address: address.clone(),
            });
            self.bus.fire_event(LoadSceneSuccess {
                scene_asset_address: address.clone(),
                scene_asset: Some(scene),
                duration: FRAME,
            });
        }
        Ok(())
    }

    fn unload_scene(&self, address: &AssetAddress) -> Result<(), HostError> {
        self.record(format!("unload-scene:{address}"));
        self.bus.fire_event(UnloadSceneSuccess {
            scene_asset_address: address.clone(),
        });
        Ok(())
    }
}

impl UiHost for FakeFramework {
    fn open_ui_form(&self, request: &OpenUiFormRequest) -> Result<SerialId, HostError> {
        let serial_id = SerialId(self.next_serial.fetch_add(1, Ordering::SeqCst));
        self.record(format!("open-ui-form:{}#{serial_id}", request.asset_name));
        self.bus.fire_event(OpenUiFormSuccess {
            ui_form: UiForm {
                serial_id,
                asset_name: request.asset_name.clone(),
                group: request.group.clone(),
                logic: None,
            },
            duration: FRAME,
        });
        Ok(serial_id)
    }
}

struct FakeTable {
    bus: Arc<InMemoryEventBus>,
}

impl DataTable for FakeTable {
    fn read_data(&self, asset_name: &str, _priority: Priority) -> Result<(), HostError> {
        self.bus.fire_event(LoadDataTableSuccess {
            data_table_asset_name: asset_name.into(),
            duration: FRAME,
        });
        Ok(())
    }
}

impl DataTableHost for FakeFramework {
    fn create_data_table(&self, row_type: &RowType, name: Option<&str>) -> Result<Arc<dyn DataTable>, HostError> {
        self.record(format!("create-data-table:{}:{}", row_type.name, name.unwrap_or("")));
        Ok(Arc::new(FakeTable {
            bus: Arc::clone(&self.bus),
        }))
    }

    fn set_current_package(&self, package_name: &str) -> Result<(), HostError> {
        self.record(format!("set-package:{package_name}"));
        Ok(())
    }
}

impl GameSceneHost for FakeFramework {
    /// Loads in one step. A failed attempt is retried once if the policy
    /// agrees.
    fn load_game_scene(
        &self,
        address: &AssetAddress,
        callbacks: GameSceneCallbacks,
        _user_data: Option<UserData>,
        retry_policy: Option<Arc<dyn RetryPolicy>>,
    ) -> Result<(), HostError> {
        self.record(format!("load-game-scene:{address}"));
        callbacks.report_state(GameSceneLoadState::LoadingScene);

        if !self.take_scene_failure() {
            callbacks.report_state(GameSceneLoadState::Initializing);
            callbacks.report_state(GameSceneLoadState::Completed);
            callbacks.succeed();
            return Ok(());
        }

        let error = HostError::SceneLoad {
            address: address.to_string(),
            message: "asset bundle missing".into(),
        };
        let Some(policy) = retry_policy else {
            callbacks.report_state(GameSceneLoadState::Failed);
            callbacks.fail(error);
            return Ok(());
        };

        let slot = Arc::new(Mutex::new(Some(callbacks)));
        let on_decision = {
            let slot = Arc::clone(&slot);
            let error = error.clone();
            move |retry: bool| {
                let callbacks = slot.lock().take();
                let Some(callbacks) = callbacks else { return };
                if retry {
                    callbacks.report_state(GameSceneLoadState::Retrying { retry_count: 1 });
                    callbacks.report_state(GameSceneLoadState::Completed);
                    callbacks.succeed();
                } else {
                    callbacks.report_state(GameSceneLoadState::Failed);
                    callbacks.fail(error);
                }
            }
        };
        let on_policy_failed = move |policy_error: TaskError| {
            let callbacks = slot.lock().take();
            if let Some(callbacks) = callbacks {
                callbacks.report_state(GameSceneLoadState::Failed);
                callbacks.fail(HostError::Other(policy_error.to_string()));
            }
        };
        policy.should_retry(0, &error, Box::new(on_decision), Box::new(on_policy_failed));
        Ok(())
    }
}

/// Fake network channel. Connects only when the scenario says so.
pub struct FakeChannel {
    id: ChannelId,
    bus: Arc<InMemoryEventBus>,
    connected: AtomicBool,
    connects: AtomicUsize,
}

impl FakeChannel {
    pub fn new(name: &str, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            id: ChannelId::new(name),
            bus,
            connected: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn complete_connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.bus.fire_event_now(NetworkConnected {
            channel: self.id.clone(),
        });
    }

    pub fn deliver<M: Any + Send + Sync>(&self, message: M) {
        self.bus
            .fire_event(NetworkMessage::new(self.id.clone(), message));
    }

    pub fn report_error(&self, code: NetworkErrorCode, message: &str) {
        self.bus.fire_event(NetworkError {
            channel: self.id.clone(),
            code,
            message: message.into(),
        });
    }

    pub fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.bus.fire_event(NetworkClosed {
            channel: self.id.clone(),
        });
    }
}

impl NetworkChannel for FakeChannel {
    fn id(&self) -> ChannelId {
        self.id.clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connect(&self, _address: SocketAddr) -> Result<(), HostError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
