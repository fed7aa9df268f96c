//! Asset loading.
//!
//! Keyed by the asset path. A request for the sub-assets of an address shares
//! the load of that address, so the result is checked against the shape the
//! caller asked for when it arrives.

use crate::adapters::{malformed_success, operation_failed};
use crate::domain::{Completion, CompletionRegistry};
use crate::error::TaskResult;
use crate::ports::{LoadAssetCallbacks, ResourceLoader};
use shared_types::{
    AssetAddress, AssetKind, AssetObject, LoadResourceStatus, LoadedAsset, Priority, UserData,
};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const LOAD_ASSET: &str = "load asset";

pub struct ResourceTasks {
    loader: Arc<dyn ResourceLoader>,
    loads: Arc<CompletionRegistry<String, LoadedAsset>>,
}

impl ResourceTasks {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            loads: Arc::new(CompletionRegistry::new(LOAD_ASSET)),
        }
    }

    pub fn registry(&self) -> &CompletionRegistry<String, LoadedAsset> {
        &self.loads
    }

    /// Load the asset at `address`, or attach to its load in flight.
    pub fn load_asset_async(
        &self,
        address: &AssetAddress,
        kind: Option<AssetKind>,
        priority: Option<Priority>,
        user_data: Option<UserData>,
    ) -> Completion<LoadedAsset> {
        let loads = Arc::clone(&self.loads);
        let loader = &self.loader;

        self.loads.get_or_start(address.path(), move |path| {
            let on_success = {
                let loads = Arc::clone(&loads);
                let path = path.clone();
                move |asset: Option<LoadedAsset>, _duration: Duration| {
                    loads.resolve(&path, loaded_outcome(&path, asset));
                }
            };
            let on_failure = {
                let path = path.clone();
                move |status: LoadResourceStatus, message: String| {
                    loads.resolve_failure(
                        &path,
                        operation_failed(LOAD_ASSET, &path, format!("{status}: {message}")),
                    );
                }
            };

            loader.load_asset(
                address,
                kind,
                priority,
                user_data,
                LoadAssetCallbacks::new(on_success, on_failure),
            )
        })
    }

    /// Load a single asset of type `T`.
    pub fn load_asset<T: Any + Send + Sync>(
        &self,
        address: &AssetAddress,
        priority: Option<Priority>,
        user_data: Option<UserData>,
    ) -> impl Future<Output = TaskResult<Arc<T>>> + Send + 'static {
        let completion =
            self.load_asset_async(address, Some(AssetKind::of::<T>()), priority, user_data);
        let path = address.path();
        async move {
            match completion.await? {
                LoadedAsset::Single(asset) => downcast_asset::<T>(&path, asset),
                LoadedAsset::Many(assets) => Err(malformed_success(
                    LOAD_ASSET,
                    &path,
                    format!("expected one asset, got {} sub-assets", assets.len()),
                )),
            }
        }
    }

    /// Load every sub-asset of type `T`.
    pub fn load_sub_assets<T: Any + Send + Sync>(
        &self,
        address: &AssetAddress,
        priority: Option<Priority>,
        user_data: Option<UserData>,
    ) -> impl Future<Output = TaskResult<Vec<Arc<T>>>> + Send + 'static {
        let untyped =
            self.load_sub_assets_untyped(address, Some(AssetKind::of::<T>()), priority, user_data);
        let path = address.path();
        async move {
            untyped
                .await?
                .into_iter()
                .map(|asset| downcast_asset::<T>(&path, asset))
                .collect()
        }
    }

    /// Load every sub-asset, optionally restricted to `element` type.
    pub fn load_sub_assets_untyped(
        &self,
        address: &AssetAddress,
        element: Option<AssetKind>,
        priority: Option<Priority>,
        user_data: Option<UserData>,
    ) -> impl Future<Output = TaskResult<Vec<AssetObject>>> + Send + 'static {
        let kind = element.unwrap_or_else(AssetKind::any).as_array();
        let completion = self.load_asset_async(address, Some(kind), priority, user_data);
        let path = address.path();
        async move {
            match completion.await? {
                LoadedAsset::Many(assets) => Ok(assets),
                LoadedAsset::Single(_) => Err(malformed_success(
                    LOAD_ASSET,
                    &path,
                    "expected sub-assets, got a single asset",
                )),
            }
        }
    }
}

fn loaded_outcome(path: &str, asset: Option<LoadedAsset>) -> TaskResult<LoadedAsset> {
    match asset {
        Some(asset) => Ok(asset),
        None => {
            warn!(path, "Asset load reported success without an asset");
            Err(malformed_success(LOAD_ASSET, path, "asset is null"))
        }
    }
}

fn downcast_asset<T: Any + Send + Sync>(path: &str, asset: AssetObject) -> TaskResult<Arc<T>> {
    asset.downcast::<T>().map_err(|_| {
        malformed_success(
            LOAD_ASSET,
            path,
            format!("asset is not a {}", std::any::type_name::<T>()),
        )
    })
}
