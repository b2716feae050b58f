//! Typed wrappers for the method families the DreamBot shim exposes
//!
//! Each wrapper builds the argument list and delegates to
//! [`RpcClient::call`](crate::RpcClient::call); the method strings are the
//! shim's wire names, casing and all. No game logic lives here — results come
//! back as plain [`Outcome`]s, with `Outcome::as_bool`/`as_i64` available for
//! the loosely typed payloads the shim produces.

use crate::client::RpcClient;
use pipecall_core::{Outcome, Result};
use serde_json::json;

impl RpcClient {
    /// Whether the bank interface is open
    pub async fn check_bank_open(&self) -> Result<Outcome> {
        self.call("bankIsOpen", vec![]).await
    }

    pub async fn close_bank(&self) -> Result<Outcome> {
        self.call("closeBank", vec![]).await
    }

    pub async fn withdraw_item(&self, name: &str, quantity: u32) -> Result<Outcome> {
        self.call("withdrawItem", vec![json!(name), json!(quantity)])
            .await
    }

    pub async fn deposit_item(&self, name: &str, quantity: u32) -> Result<Outcome> {
        self.call("depositItem", vec![json!(name), json!(quantity)])
            .await
    }

    pub async fn deposit_all(&self) -> Result<Outcome> {
        self.call("depositAll", vec![]).await
    }

    pub async fn inventory_count(&self) -> Result<Outcome> {
        self.call("getInventoryCount", vec![]).await
    }

    /// Check for an item by name, or by numeric id string with `by_id`
    pub async fn inventory_contains_item(&self, item: &str, by_id: bool) -> Result<Outcome> {
        self.call("inventoryContainsItem", vec![json!(item), json!(by_id)])
            .await
    }

    pub async fn current_tile(&self) -> Result<Outcome> {
        self.call("get_current_tile", vec![]).await
    }

    pub async fn walk_to(&self, x: i32, y: i32) -> Result<Outcome> {
        self.call("walk_to_location", vec![json!(x), json!(y)]).await
    }

    pub async fn click_object(&self, name: &str) -> Result<Outcome> {
        self.call("click_object", vec![json!(name)]).await
    }

    /// Perform a named inventory action ("Drink", "Eat", "Use", …) on an
    /// item, optionally against a target. `target_type` is the shim's
    /// taxonomy for the target ("object", "item", "npc").
    pub async fn perform_item_action(
        &self,
        action: &str,
        item: &str,
        target: Option<&str>,
        by_id: bool,
        target_type: &str,
    ) -> Result<Outcome> {
        self.call(
            "performItemAction",
            vec![
                json!(action),
                json!(item),
                json!(target),
                json!(by_id),
                json!(target_type),
            ],
        )
        .await
    }

    pub async fn use_item_on_item(
        &self,
        primary: &str,
        secondary: &str,
        by_id: bool,
    ) -> Result<Outcome> {
        self.call(
            "useItemOnItem",
            vec![json!(primary), json!(secondary), json!(by_id)],
        )
        .await
    }

    pub async fn list_nearby_game_objects(&self) -> Result<Outcome> {
        self.call("listNearbyGameObjects", vec![]).await
    }

    pub async fn game_objects_for_action(&self, action: &str) -> Result<Outcome> {
        self.call("getGameObjectsForAction", vec![json!(action)])
            .await
    }

    pub async fn search_game_objects(&self, term: &str) -> Result<Outcome> {
        self.call("searchGameObjects", vec![json!(term)]).await
    }

    pub async fn object_details(&self, name: &str) -> Result<Outcome> {
        self.call("getObjectDetails", vec![json!(name)]).await
    }
}
