//! # End-to-End Scenarios
//!
//! Each scenario builds a [`TaskBridge`] over a fresh bus and the fake
//! framework, then plays the host side frame by frame.

#[cfg(test)]
mod tests {
    use crate::integration::fakes::{FakeChannel, FakeFramework};
    use async_trait::async_trait;
    use futures::future::join_all;
    use game_tasks::{
        run_with_retry, AsyncRetryPolicy, CascadeCause, FixedRetryPolicy, GameSceneLoadOptions,
        LoadDataTableRequest, OpenUiFormRequest, ShowEntityRequest, TaskBridge, TaskError,
    };
    use parking_lot::Mutex;
    use shared_bus::events::LoadSceneSuccess;
    use shared_bus::{EventBusExt, EventKind, InMemoryEventBus};
    use shared_types::{
        AssetAddress, AssetObject, ChannelId, EntityId, GameSceneLoadState, HostError,
        LoadSceneParameters, LoadedAsset, NetworkErrorCode,
    };
    use std::net::SocketAddr;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn setup() -> (Arc<FakeFramework>, TaskBridge) {
        task_telemetry::init_test_logging();

        let bus = Arc::new(InMemoryEventBus::new());
        let framework = FakeFramework::new(bus.clone());
        let bridge = TaskBridge::builder(bus)
            .with_resource_loader(framework.clone())
            .with_entity_host(framework.clone())
            .with_scene_host(framework.clone())
            .with_game_scene_host(framework.clone())
            .with_ui_host(framework.clone())
            .with_data_table_host(framework.clone())
            .build()
            .expect("bridge builds");
        (framework, bridge)
    }

    fn menu() -> AssetAddress {
        AssetAddress::new("main", "scenes/menu")
    }

    fn server() -> SocketAddr {
        SocketAddr::from(([10, 0, 0, 5], 7777))
    }

    #[derive(Debug, PartialEq)]
    struct Texture(String);

    #[derive(Debug, PartialEq)]
    struct Login {
        player: u32,
    }

    #[derive(Debug)]
    struct Chat;

    struct ItemRow;

    /// A policy whose decision always fails.
    struct OfflinePolicy;

    #[async_trait]
    impl AsyncRetryPolicy for OfflinePolicy {
        async fn should_retry(&self, _retry_count: u32, _error: &TaskError) -> Result<bool, TaskError> {
            Err(TaskError::Host(HostError::Other("policy store offline".into())))
        }
    }

    // =============================================================================
    // SINGLE FLIGHT
    // =============================================================================

    #[tokio::test]
    async fn test_scene_loads_share_one_start_and_restart_after_resolution() {
        let (framework, bridge) = setup();
        let scenes = bridge.scenes().expect("scene host configured");

        let waiters: Vec<_> = (0..5)
            .map(|_| scenes.load_scene_async(menu(), LoadSceneParameters::default(), None))
            .collect();
        assert_eq!(framework.start_count("load-scene:"), 1);

        assert_eq!(framework.frame(), 1);
        for outcome in join_all(waiters).await {
            assert_eq!(outcome.expect("scene loads").address, menu());
        }
        assert!(!scenes.loads().contains(&menu()));

        let again = scenes.load_scene_async(menu(), LoadSceneParameters::default(), None);
        assert_eq!(framework.start_count("load-scene:"), 2);
        framework.frame();
        assert!(again.await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_entity_shows_from_many_tasks() {
        let (framework, bridge) = setup();
        let bridge = Arc::new(bridge);

        let spawned: Vec<_> = (0..16)
            .map(|_| {
                let bridge = Arc::clone(&bridge);
                tokio::spawn(async move {
                    bridge
                        .entities()
                        .expect("entity host configured")
                        .show_entity_async(ShowEntityRequest::new(
                            EntityId(42),
                            "Boss",
                            AssetAddress::in_current_package("entities/boss"),
                            "bosses",
                        ))
                })
            })
            .collect();

        let mut waiters = Vec::new();
        for handle in spawned {
            waiters.push(handle.await.expect("task completes"));
        }
        assert_eq!(framework.starts(), vec!["show-entity:42@80".to_string()]);

        framework.frame();
        for outcome in join_all(waiters).await {
            assert_eq!(outcome.expect("entity shown").logic_type, "Boss");
        }
    }

    #[tokio::test]
    async fn test_unknown_key_event_is_ignored() {
        let (framework, bridge) = setup();
        let scenes = bridge.scenes().expect("scene host configured");

        let scene: AssetObject = Arc::new("stray");
        framework.bus().fire_event(LoadSceneSuccess {
            scene_asset_address: AssetAddress::new("main", "scenes/never-requested"),
            scene_asset: Some(scene),
            duration: Duration::ZERO,
        });

        assert_eq!(framework.frame(), 1);
        assert_eq!(scenes.loads().stats().ignored.load(Ordering::Relaxed), 1);
    }

    // =============================================================================
    // DOMAIN FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_ui_forms_correlate_by_serial_id() {
        let (framework, bridge) = setup();
        let ui = bridge.ui_forms().expect("ui host configured");

        let settings = ui.open_ui_form_async(OpenUiFormRequest::new("forms/settings", "popups"));
        let shop = ui.open_ui_form_async(OpenUiFormRequest::new("forms/shop", "popups"));
        let settings_again = ui.open_ui_form_async(OpenUiFormRequest::new("forms/settings", "popups"));
        assert_eq!(framework.start_count("open-ui-form:"), 3);

        framework.frame();

        let (settings, shop, settings_again) = (
            settings.await.expect("settings opens"),
            shop.await.expect("shop opens"),
            settings_again.await.expect("second settings opens"),
        );
        assert_eq!(shop.asset_name, "forms/shop");
        assert_eq!(settings.asset_name, "forms/settings");
        assert_ne!(settings.serial_id, settings_again.serial_id);
    }

    #[tokio::test]
    async fn test_data_table_switches_package_before_reading() {
        let (framework, bridge) = setup();
        let tables = bridge.data_tables().expect("data table host configured");

        let waiter = tables.load_data_table_async(
            LoadDataTableRequest::new::<ItemRow>("tables/items")
                .named("weapons")
                .in_package("dlc"),
        );
        framework.frame();

        assert_eq!(waiter.await, Ok(()));
        let starts = framework.starts();
        assert!(starts[0].starts_with("create-data-table:") && starts[0].ends_with(":weapons"));
        assert_eq!(starts[1], "set-package:dlc");
    }

    #[tokio::test]
    async fn test_asset_loads_share_callbacks() {
        let (framework, bridge) = setup();
        let resources = bridge.resources().expect("resource loader configured");
        let sword = AssetAddress::new("ui", "icons/sword");

        let a = resources.load_asset::<Texture>(&sword, None, None);
        let b = resources.load_asset::<Texture>(&sword, Some(50), None);
        let missing = resources.load_asset_async(&AssetAddress::in_current_package("icons/none"), None, None, None);
        assert_eq!(framework.start_count("load-asset:"), 2);

        let answered = framework.finish_asset_loads(|address, _kind| {
            (address.location == "icons/sword")
                .then(|| LoadedAsset::Single(Arc::new(Texture(address.path()))))
        });
        assert_eq!(answered, 2);

        assert_eq!(*a.await.expect("texture loads"), Texture("ui/icons/sword".into()));
        assert_eq!(*b.await.expect("texture loads"), Texture("ui/icons/sword".into()));
        assert!(matches!(missing.await, Err(TaskError::MalformedSuccess { .. })));
    }

    // =============================================================================
    // NETWORK
    // =============================================================================

    #[tokio::test]
    async fn test_channel_connect_receive_and_cascade() {
        let (framework, bridge) = setup();
        let network = bridge.network();
        let channel = FakeChannel::new("lobby", framework.bus().clone());
        let lobby = ChannelId::new("lobby");

        let first = network.connect_async(&channel, server());
        let second = network.connect_async(&channel, server());
        assert_eq!(channel.connects(), 1);

        channel.complete_connect();
        assert_eq!(first.await, Ok(()));
        assert_eq!(second.await, Ok(()));
        assert_eq!(network.connect_async(&channel, server()).await, Ok(()));
        assert_eq!(channel.connects(), 1);

        let login = network.receive_async::<Login>(&lobby);
        let chat = network.receive_async::<Chat>(&lobby);
        channel.deliver(Login { player: 3 });
        framework.frame();

        assert_eq!(*login.await.expect("login arrives"), Login { player: 3 });
        assert_eq!(network.pending_receives(&lobby), 1);

        let next_login = network.receive_async::<Login>(&lobby);
        channel.report_error(NetworkErrorCode::DeserializePacketError, "bad header");
        framework.frame();

        for outcome in [chat.await.map(|_| ()), next_login.await.map(|_| ())] {
            assert_eq!(
                outcome,
                Err(TaskError::CascadedFailure {
                    channel: lobby.clone(),
                    cause: CascadeCause::Error(NetworkErrorCode::DeserializePacketError),
                    message: "bad header".into(),
                })
            );
        }
        assert_eq!(network.pending_receives(&lobby), 0);
        assert_eq!(network.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_channel_fails_connect_and_receives() {
        let (framework, bridge) = setup();
        let network = bridge.network();
        let channel = FakeChannel::new("battle", framework.bus().clone());
        let battle = ChannelId::new("battle");

        let connect = network.connect_async(&channel, server());
        let login = network.receive_async::<Login>(&battle);
        channel.close();
        framework.frame();

        assert!(connect.await.expect_err("connect fails").is_cascade());
        assert!(matches!(
            login.await,
            Err(TaskError::CascadedFailure {
                cause: CascadeCause::Closed,
                ..
            })
        ));
        assert_eq!(network.channel_count(), 0);
    }

    // =============================================================================
    // RETRY
    // =============================================================================

    #[tokio::test]
    async fn test_caller_driven_retry_recovers() {
        let (framework, bridge) = setup();
        let scenes = bridge.scenes().expect("scene host configured");
        framework.fail_next_scene_loads(2);

        let scene = run_with_retry(&FixedRetryPolicy::new(3, Duration::ZERO), || {
            let attempt = scenes.load_scene_async(menu(), LoadSceneParameters::default(), None);
            framework.frame();
            attempt
        })
        .await;

        assert_eq!(scene.expect("third attempt loads").address, menu());
        assert_eq!(framework.start_count("load-scene:"), 3);
    }

    #[tokio::test]
    async fn test_failing_retry_policy_keeps_original_error() {
        let (framework, bridge) = setup();
        let scenes = bridge.scenes().expect("scene host configured");
        framework.fail_next_scene_loads(1);

        let outcome = run_with_retry(&OfflinePolicy, || {
            let attempt = scenes.load_scene_async(menu(), LoadSceneParameters::default(), None);
            framework.frame();
            attempt
        })
        .await;

        match outcome {
            Err(TaskError::RetryPolicyFailed {
                policy_error,
                original,
            }) => {
                assert!(original.is_operation_failure());
                assert!(original.to_string().contains("asset bundle missing"));
                assert!(policy_error.to_string().contains("policy store offline"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_game_scene_retried_by_host() {
        let (framework, bridge) = setup();
        let game_scenes = bridge.game_scenes().expect("game scene host configured");
        framework.fail_next_scene_loads(1);

        let states = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&states);
        let options = GameSceneLoadOptions::new()
            .on_progress(move |state| recorded.lock().push(state))
            .with_async_retry_policy(Arc::new(FixedRetryPolicy::new(1, Duration::ZERO)))
            .expect("runtime available");

        assert_eq!(game_scenes.load_game_scene_async(&menu(), options).await, Ok(()));
        assert_eq!(
            *states.lock(),
            vec![
                GameSceneLoadState::LoadingScene,
                GameSceneLoadState::Retrying { retry_count: 1 },
                GameSceneLoadState::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_game_scene_failure_without_policy() {
        let (framework, bridge) = setup();
        let game_scenes = bridge.game_scenes().expect("game scene host configured");
        framework.fail_next_scene_loads(1);

        let outcome = game_scenes
            .load_game_scene_async(&menu(), GameSceneLoadOptions::new())
            .await;
        assert!(matches!(
            outcome,
            Err(TaskError::Host(HostError::SceneLoad { .. }))
        ));
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_shutdown_detaches_routers() {
        let (framework, bridge) = setup();
        let scenes = bridge.scenes().expect("scene host configured");

        let waiter = scenes.load_scene_async(menu(), LoadSceneParameters::default(), None);
        assert!(bridge.shutdown() > 0);
        framework.frame();

        assert_eq!(
            framework
                .bus()
                .handler_count(EventKind::of::<LoadSceneSuccess>().id()),
            0
        );
        assert!(scenes.loads().contains(&menu()));
        assert_eq!(framework.bus().events_unhandled(), 1);
        drop(waiter);
    }
}
